use std::future::Future;
use std::io;
use std::path::Path;

/// Result of running one shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Combined output, trimmed, for error reports.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr).trim().to_string()
    }
}

/// Runs remediation commands. `Err` means the process could not be started.
pub trait ICommandExecutor: Send + Sync {
    fn run(
        &self,
        command: &str,
        working_dir: &Path,
    ) -> impl Future<Output = io::Result<CommandOutput>> + Send;
}
