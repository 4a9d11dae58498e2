//! Resolution against a real store, application against a scripted executor.

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use deployiq_core::config::{MemoryConfig, ResolverConfig};
use deployiq_core::errors::SolutionApplicationError;
use deployiq_core::models::{
    AppliedSolution, AttemptUpdate, DeploymentAttempt, DeploymentOutcome, DeploymentStatus,
    ErrorRecord, ErrorType, FileAction, FileChange, Solution,
};
use deployiq_core::traits::{CommandOutput, ICommandExecutor, IDeploymentStore};
use deployiq_memory::DeploymentMemory;
use deployiq_resolver::{ApplyContext, AutoResolver, REASON_AUTOMATION_NOT_SAFE};
use deployiq_storage::StorageEngine;

const LODASH: &str = "Module not found: 'lodash'";

/// Records every command and fails the ones listed.
#[derive(Default)]
struct ScriptedExecutor {
    ran: Mutex<Vec<String>>,
    failing: Vec<String>,
}

impl ScriptedExecutor {
    fn failing(commands: &[&str]) -> Self {
        Self {
            ran: Mutex::new(Vec::new()),
            failing: commands.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn ran(&self) -> Vec<String> {
        self.ran.lock().unwrap().clone()
    }
}

impl ICommandExecutor for ScriptedExecutor {
    async fn run(&self, command: &str, _working_dir: &Path) -> io::Result<CommandOutput> {
        self.ran.lock().unwrap().push(command.to_string());
        let failed = self.failing.iter().any(|c| c == command);
        Ok(CommandOutput {
            exit_code: Some(if failed { 1 } else { 0 }),
            stdout: String::new(),
            stderr: if failed { "boom".into() } else { String::new() },
        })
    }
}

fn memory() -> DeploymentMemory {
    let store: Arc<dyn IDeploymentStore> = Arc::new(StorageEngine::open_in_memory().unwrap());
    DeploymentMemory::new(store, MemoryConfig::default())
}

fn resolver(memory: DeploymentMemory, executor: ScriptedExecutor) -> AutoResolver<ScriptedExecutor> {
    AutoResolver::new(memory, executor, ResolverConfig::default())
}

/// A deployment that hit the lodash error and applied `fix_id` cleanly.
fn record_history(memory: &DeploymentMemory, id: &str, fix_id: &str, outcome: DeploymentOutcome) {
    let mut attempt = DeploymentAttempt::new(id, "production");
    attempt.status = DeploymentStatus::InProgress;
    attempt
        .errors
        .push(ErrorRecord::new(ErrorType::Dependency, LODASH));
    attempt.applied_solutions.push(AppliedSolution {
        solution_id: fix_id.to_string(),
        error_pattern: deployiq_core::normalize_error(LODASH),
        applied_at: Utc::now(),
        success: true,
        failed_step: None,
        confidence: 0.9,
    });
    memory.log_attempt(attempt).unwrap();
    let close = AttemptUpdate {
        status: Some(outcome.into()),
        actual_outcome: Some(outcome),
        ..Default::default()
    };
    memory.update_status(id, &close).unwrap();
    memory.learn_from_outcome(id, outcome).unwrap();
}

fn safe_fix(description: &str, applied: u32, successful: u32) -> Solution {
    let mut fix = Solution::new(description)
        .with_command("npm install")
        .automation_safe(true);
    fix.times_applied = applied;
    fix.times_successful = successful;
    fix
}

#[test]
fn lodash_history_resolves_with_observed_success_rate() {
    let memory = memory();
    let fix = Solution::new("Install the missing module")
        .with_command("npm install lodash")
        .automation_safe(true);
    let fix_id = fix.id.clone();
    memory
        .register_solution(LODASH, ErrorType::Dependency, fix)
        .unwrap();

    let outcomes = [
        DeploymentOutcome::Failed,
        DeploymentOutcome::Success,
        DeploymentOutcome::Failed,
        DeploymentOutcome::Success,
        DeploymentOutcome::Failed,
    ];
    for (i, outcome) in outcomes.into_iter().enumerate() {
        record_history(&memory, &format!("hist-{i}"), &fix_id, outcome);
    }

    let resolver = resolver(memory, ScriptedExecutor::default());
    let resolution = resolver
        .resolve_error(&ErrorRecord::new(ErrorType::Dependency, LODASH))
        .unwrap()
        .unwrap();
    assert_eq!(resolution.solution.id, fix_id);
    assert_eq!(resolution.error_pattern, "Module not found: <STR>");
    assert_eq!(resolution.solution.success_rate, 0.4);
    assert_eq!(resolution.similar_cases, 5);
    // 0.4 + 0.1 for more than two similar cases.
    assert!((resolution.confidence - 0.5).abs() < 1e-9);
}

#[test]
fn unknown_error_has_no_resolution() {
    let resolver = resolver(memory(), ScriptedExecutor::default());
    let resolution = resolver
        .resolve_error(&ErrorRecord::new(ErrorType::Runtime, "segfault in worker"))
        .unwrap();
    assert!(resolution.is_none());
}

#[test]
fn error_type_must_match() {
    let memory = memory();
    memory
        .register_solution(LODASH, ErrorType::Dependency, safe_fix("install", 5, 5))
        .unwrap();
    let resolver = resolver(memory, ScriptedExecutor::default());
    assert!(resolver
        .resolve_error(&ErrorRecord::new(ErrorType::Build, LODASH))
        .unwrap()
        .is_none());
}

#[test]
fn automation_safe_breaks_equal_stats() {
    let memory = memory();
    let mut manual = safe_fix("manual", 5, 5);
    manual.automation_safe = false;
    memory
        .register_solution(LODASH, ErrorType::Dependency, manual)
        .unwrap();
    memory
        .register_solution(LODASH, ErrorType::Dependency, safe_fix("auto", 5, 5))
        .unwrap();

    let resolver = resolver(memory, ScriptedExecutor::default());
    let resolution = resolver
        .resolve_error(&ErrorRecord::new(ErrorType::Dependency, LODASH))
        .unwrap()
        .unwrap();
    assert_eq!(resolution.solution.description, "auto");
    assert_eq!(resolution.candidates_considered, 2);
    assert_eq!(resolution.confidence, 0.95);
}

#[tokio::test]
async fn unsafe_solution_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver(memory(), ScriptedExecutor::default());
    let solution = Solution::new("manual fix")
        .with_command("rm -rf node_modules")
        .with_file_change(FileChange {
            path: "marker".into(),
            action: FileAction::Create,
            content: Some("x".into()),
        });

    let report = resolver
        .apply_solution(&solution, &ApplyContext::new(dir.path()))
        .await;
    assert!(!report.success);
    assert_eq!(report.refused, Some(REASON_AUTOMATION_NOT_SAFE));
    assert_eq!(report.steps_run, 0);
    assert!(resolver.executor().ran().is_empty());
    assert!(!dir.path().join("marker").exists());
}

#[tokio::test]
async fn stops_at_first_failed_command() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver(memory(), ScriptedExecutor::failing(&["npm run build"]));
    let solution = Solution::new("rebuild")
        .with_command("npm ci")
        .with_command("npm run build")
        .with_command("npm test")
        .with_file_change(FileChange {
            path: "rebuilt".into(),
            action: FileAction::Create,
            content: None,
        })
        .automation_safe(true);

    let report = resolver
        .apply_solution(&solution, &ApplyContext::new(dir.path()))
        .await;
    assert!(!report.success);
    assert_eq!(report.steps_total, 4);
    assert_eq!(report.steps_run, 1);
    assert_eq!(report.failed_step(), Some(1));
    assert!(matches!(
        report.error,
        Some(SolutionApplicationError::CommandFailed { exit_code: Some(1), .. })
    ));
    assert_eq!(resolver.executor().ran(), ["npm ci", "npm run build"]);
    assert!(!dir.path().join("rebuilt").exists());
}

#[tokio::test]
async fn commands_then_file_changes_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver(memory(), ScriptedExecutor::default());
    let solution = Solution::new("pin registry")
        .with_command("npm cache clean --force")
        .with_file_change(FileChange {
            path: ".npmrc".into(),
            action: FileAction::Create,
            content: Some("registry=https://registry.npmjs.org/\n".into()),
        })
        .with_file_change(FileChange {
            path: ".npmrc".into(),
            action: FileAction::Append,
            content: Some("legacy-peer-deps=true\n".into()),
        })
        .automation_safe(true);

    let report = resolver
        .apply_solution(&solution, &ApplyContext::new(dir.path()))
        .await;
    assert!(report.success);
    assert_eq!(report.steps_run, 3);
    assert!(report.error.is_none());
    let npmrc = std::fs::read_to_string(dir.path().join(".npmrc")).unwrap();
    assert_eq!(
        npmrc,
        "registry=https://registry.npmjs.org/\nlegacy-peer-deps=true\n"
    );
}

#[tokio::test]
async fn file_change_outside_working_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = resolver(memory(), ScriptedExecutor::default());
    let solution = Solution::new("escape")
        .with_command("true")
        .with_file_change(FileChange {
            path: "../outside.txt".into(),
            action: FileAction::Create,
            content: Some("x".into()),
        })
        .automation_safe(true);

    let report = resolver
        .apply_solution(&solution, &ApplyContext::new(dir.path()))
        .await;
    assert!(!report.success);
    assert_eq!(report.steps_run, 1);
    assert!(matches!(
        report.error,
        Some(SolutionApplicationError::FileChangeFailed { step: 1, .. })
    ));
}
