//! Remediation step failures.

use super::error_code::{self, DeployErrorCode};

/// A single remediation step failed. Reported back inside an
/// `ApplicationReport`; the same solution is never retried automatically.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolutionApplicationError {
    #[error("step {step}: command `{command}` exited with {exit_code:?}: {output}")]
    CommandFailed {
        step: usize,
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("step {step}: command `{command}` could not be started: {reason}")]
    CommandSpawn {
        step: usize,
        command: String,
        reason: String,
    },

    #[error("step {step}: file change on {path} failed: {reason}")]
    FileChangeFailed {
        step: usize,
        path: String,
        reason: String,
    },
}

impl SolutionApplicationError {
    /// Zero-based index of the failing step (commands first, then file changes).
    pub fn step(&self) -> usize {
        match self {
            Self::CommandFailed { step, .. }
            | Self::CommandSpawn { step, .. }
            | Self::FileChangeFailed { step, .. } => *step,
        }
    }
}

impl DeployErrorCode for SolutionApplicationError {
    fn error_code(&self) -> &'static str {
        error_code::SOLUTION_APPLICATION_ERROR
    }
}
