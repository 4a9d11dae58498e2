//! Build analyzer errors.
//!
//! Only total inaccessibility of the project root is an error; every optional
//! signal (git, env files, deploy config) degrades to "absent" instead.

use super::error_code::{self, DeployErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("project root {path} is inaccessible: {reason}")]
    RootInaccessible { path: String, reason: String },
}

impl DeployErrorCode for AnalyzerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RootInaccessible { .. } => error_code::ROOT_INACCESSIBLE,
        }
    }
}
