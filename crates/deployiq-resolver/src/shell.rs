//! Remediation commands run as child processes through a POSIX shell.
//! Children are killed if the awaiting task is dropped.

use std::io;
use std::path::Path;

use tokio::process::Command;

use deployiq_core::traits::{CommandOutput, ICommandExecutor};

/// Runs each command through `sh -c` in the given directory.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    shell: Option<String>,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different POSIX shell than `sh`.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: Some(shell.into()),
        }
    }
}

impl ICommandExecutor for ShellExecutor {
    async fn run(&self, command: &str, working_dir: &Path) -> io::Result<CommandOutput> {
        let shell = self.shell.as_deref().unwrap_or("sh");
        let output = Command::new(shell)
            .arg("-c")
            .arg(command)
            .current_dir(working_dir)
            .kill_on_drop(true)
            .output()
            .await?;
        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
