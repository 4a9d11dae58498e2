//! Sequential, fail-fast execution of a solution's steps.

use std::path::PathBuf;

use deployiq_core::errors::SolutionApplicationError;
use deployiq_core::models::Solution;
use deployiq_core::traits::ICommandExecutor;

use crate::file_changes;

/// Refusal reason for a solution that has not opted in to unattended use.
pub const REASON_AUTOMATION_NOT_SAFE: &str = "automation_not_safe";

/// Where a solution's commands run and its file paths resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyContext {
    pub working_dir: PathBuf,
}

impl ApplyContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

/// Outcome of one `apply_solution` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationReport {
    pub solution_id: String,
    pub success: bool,
    pub steps_total: usize,
    /// Steps that completed, in order.
    pub steps_run: usize,
    /// Set when the solution was refused before any step ran.
    pub refused: Option<&'static str>,
    pub error: Option<SolutionApplicationError>,
}

impl ApplicationReport {
    fn refused(solution: &Solution, reason: &'static str) -> Self {
        Self {
            solution_id: solution.id.clone(),
            success: false,
            steps_total: solution.step_count(),
            steps_run: 0,
            refused: Some(reason),
            error: None,
        }
    }

    pub fn failed_step(&self) -> Option<usize> {
        self.error.as_ref().map(SolutionApplicationError::step)
    }
}

/// Commands first, then file changes, stopping at the first failure. Steps
/// already run are not rolled back.
pub async fn apply<E: ICommandExecutor>(
    executor: &E,
    solution: &Solution,
    ctx: &ApplyContext,
) -> ApplicationReport {
    if !solution.automation_safe {
        tracing::warn!(solution_id = %solution.id, "refusing to apply solution not marked automation safe");
        return ApplicationReport::refused(solution, REASON_AUTOMATION_NOT_SAFE);
    }

    let mut report = ApplicationReport {
        solution_id: solution.id.clone(),
        success: false,
        steps_total: solution.step_count(),
        steps_run: 0,
        refused: None,
        error: None,
    };

    for (step, command) in solution.commands.iter().enumerate() {
        let failure = match executor.run(command, &ctx.working_dir).await {
            Ok(output) if output.success() => None,
            Ok(output) => Some(SolutionApplicationError::CommandFailed {
                step,
                command: command.clone(),
                exit_code: output.exit_code,
                output: output.combined(),
            }),
            Err(e) => Some(SolutionApplicationError::CommandSpawn {
                step,
                command: command.clone(),
                reason: e.to_string(),
            }),
        };
        if let Some(error) = failure {
            tracing::warn!(solution_id = %solution.id, %error, "solution step failed");
            report.error = Some(error);
            return report;
        }
        report.steps_run += 1;
    }

    let offset = solution.commands.len();
    for (i, change) in solution.file_changes.iter().enumerate() {
        if let Err(reason) = file_changes::apply(change, &ctx.working_dir).await {
            let error = SolutionApplicationError::FileChangeFailed {
                step: offset + i,
                path: change.path.clone(),
                reason,
            };
            tracing::warn!(solution_id = %solution.id, %error, "solution step failed");
            report.error = Some(error);
            return report;
        }
        report.steps_run += 1;
    }

    report.success = true;
    tracing::info!(solution_id = %solution.id, steps = report.steps_run, "solution applied");
    report
}
