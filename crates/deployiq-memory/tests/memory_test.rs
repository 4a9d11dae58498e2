//! DeploymentMemory against the SQLite store.

use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;

use deployiq_core::config::MemoryConfig;
use deployiq_core::models::{
    AppliedSolution, AttemptUpdate, BuildConfigSnapshot, BuildPattern, DeploymentAttempt,
    DeploymentOutcome, DeploymentStatus, ErrorRecord, ErrorType, RiskFactor, Severity, Solution,
};
use deployiq_core::patterns::fingerprint;
use deployiq_core::traits::IDeploymentStore;
use deployiq_memory::DeploymentMemory;
use deployiq_storage::StorageEngine;

const LODASH: &str = "Module not found: 'lodash'";
const LODASH_PATTERN: &str = "Module not found: <STR>";

fn memory() -> DeploymentMemory {
    let store: Arc<dyn IDeploymentStore> = Arc::new(StorageEngine::open_in_memory().unwrap());
    DeploymentMemory::new(store, MemoryConfig::default())
}

fn applied(solution_id: &str, success: bool) -> AppliedSolution {
    AppliedSolution {
        solution_id: solution_id.to_string(),
        error_pattern: LODASH_PATTERN.to_string(),
        applied_at: Utc::now(),
        success,
        failed_step: None,
        confidence: 0.9,
    }
}

/// Log an attempt, close it with `outcome`, and learn from it.
fn finish(
    memory: &DeploymentMemory,
    mut attempt: DeploymentAttempt,
    outcome: DeploymentOutcome,
) -> deployiq_core::models::LearningResult {
    attempt.status = DeploymentStatus::InProgress;
    let logged = memory.log_attempt(attempt).unwrap();
    let close = AttemptUpdate {
        status: Some(outcome.into()),
        actual_outcome: Some(outcome),
        completed_at: Some(Utc::now()),
        ..Default::default()
    };
    memory.update_status(&logged.deployment_id, &close).unwrap();
    memory
        .learn_from_outcome(&logged.deployment_id, outcome)
        .unwrap()
}

fn pinned_snapshot() -> BuildConfigSnapshot {
    let mut snap = BuildConfigSnapshot {
        runtime_version: Some("20".into()),
        framework: Some("nextjs".into()),
        framework_version: Some("14.1.0".into()),
        has_manifest: true,
        has_lockfile: true,
        ..Default::default()
    };
    snap.dependencies.insert("next".into(), "14.1.0".into());
    snap
}

#[test]
fn log_attempt_assigns_id_and_fingerprint() {
    let memory = memory();
    let logged = memory
        .log_attempt(DeploymentAttempt::new("", "production"))
        .unwrap();
    assert_eq!(logged.deployment_id.len(), 36);
    assert_eq!(
        logged.config_fingerprint,
        fingerprint(&BuildConfigSnapshot::default())
    );
}

#[test]
fn log_attempt_never_overwrites() {
    let memory = memory();
    memory
        .log_attempt(DeploymentAttempt::new("dep-1", "production"))
        .unwrap();
    let again = memory
        .log_attempt(DeploymentAttempt::new("dep-1", "staging"))
        .unwrap();
    assert_eq!(again.environment, "production");
}

#[test]
fn update_status_on_unknown_id_is_none() {
    let memory = memory();
    let update = AttemptUpdate {
        status: Some(DeploymentStatus::InProgress),
        ..Default::default()
    };
    assert!(memory.update_status("ghost", &update).unwrap().is_none());
}

#[test]
fn terminal_attempts_ignore_updates() {
    let memory = memory();
    let mut attempt = DeploymentAttempt::new("dep-t", "production");
    attempt.status = DeploymentStatus::Success;
    memory.log_attempt(attempt).unwrap();

    let update = AttemptUpdate {
        status: Some(DeploymentStatus::Failed),
        ..Default::default()
    };
    let stored = memory.update_status("dep-t", &update).unwrap().unwrap();
    assert_eq!(stored.status, DeploymentStatus::Success);
}

#[test]
fn lodash_fix_ranks_with_observed_success_rate() {
    let memory = memory();
    let mut fix = Solution::new("Install the missing module")
        .with_command("npm install lodash")
        .automation_safe(true);
    fix.times_applied = 5;
    fix.times_successful = 2;
    memory
        .register_solution(LODASH, ErrorType::Dependency, fix)
        .unwrap();

    let pattern = deployiq_core::normalize_error(LODASH);
    let ranked = memory
        .rank_solutions_above(&pattern, Some(ErrorType::Dependency), 0.0)
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].solution.success_rate, 0.4);
    assert_eq!(ranked[0].solution.effectiveness, 4.0);
    assert!(!ranked[0].verified);

    // Below the default ranking floor of 6.
    assert!(memory
        .rank_solutions(&pattern, Some(ErrorType::Dependency))
        .unwrap()
        .is_empty());
}

#[test]
fn register_replaces_solution_with_same_id() {
    let memory = memory();
    let fix = Solution::new("first").with_command("npm ci");
    let id = fix.id.clone();
    memory
        .register_solution(LODASH, ErrorType::Dependency, fix.clone())
        .unwrap();
    let mut revised = fix;
    revised.description = "second".into();
    let entry = memory
        .register_solution(LODASH, ErrorType::Dependency, revised)
        .unwrap();
    assert_eq!(entry.solutions.len(), 1);
    assert_eq!(entry.solutions[0].id, id);
    assert_eq!(entry.solutions[0].description, "second");
}

#[test]
fn learning_updates_applied_solution_once() {
    let memory = memory();
    let fix = Solution::new("reinstall").with_command("npm ci");
    let fix_id = fix.id.clone();
    memory
        .register_solution(LODASH, ErrorType::Dependency, fix)
        .unwrap();

    let mut attempt = DeploymentAttempt::new("dep-learn", "production");
    attempt.applied_solutions.push(applied(&fix_id, true));
    let result = finish(&memory, attempt, DeploymentOutcome::Success);
    assert!(result.applied);
    assert_eq!(result.solutions_updated, 1);
    assert_eq!(result.build_pattern_rate, Some(1.0));

    let again = memory
        .learn_from_outcome("dep-learn", DeploymentOutcome::Success)
        .unwrap();
    assert!(!again.applied);

    let entry = memory
        .store()
        .find_known_solution_by_solution_id(LODASH_PATTERN, &fix_id)
        .unwrap()
        .unwrap();
    let solution = &entry.solutions[0];
    assert_eq!(solution.times_applied, 1);
    assert_eq!(solution.times_successful, 1);
    assert!(solution.last_used.is_some());
    assert!((entry.confidence - 0.15).abs() < 1e-9);

    let stored = memory.store().get_attempt("dep-learn").unwrap().unwrap();
    assert!(stored.learned_at.is_some());
}

#[test]
fn clean_application_on_failed_deployment_counts_as_failure() {
    let memory = memory();
    let fix = Solution::new("reinstall").with_command("npm ci");
    let fix_id = fix.id.clone();
    memory
        .register_solution(LODASH, ErrorType::Dependency, fix)
        .unwrap();

    let mut attempt = DeploymentAttempt::new("dep-f", "production");
    attempt.applied_solutions.push(applied(&fix_id, true));
    finish(&memory, attempt, DeploymentOutcome::Failed);

    let entry = memory
        .store()
        .find_known_solution_by_solution_id(LODASH_PATTERN, &fix_id)
        .unwrap()
        .unwrap();
    assert_eq!(entry.solutions[0].times_applied, 1);
    assert_eq!(entry.solutions[0].times_successful, 0);
    assert!((entry.confidence - 0.05).abs() < 1e-9);
}

#[test]
fn learning_unknown_deployment_is_noop() {
    let memory = memory();
    let result = memory
        .learn_from_outcome("ghost", DeploymentOutcome::Failed)
        .unwrap();
    assert!(!result.applied);
}

#[test]
fn failures_grow_the_error_catalog() {
    let memory = memory();
    let mut first = DeploymentAttempt::new("dep-a", "production");
    first
        .errors
        .push(ErrorRecord::new(ErrorType::Dependency, LODASH));
    let result = finish(&memory, first, DeploymentOutcome::Failed);
    assert_eq!(result.patterns_created, 1);

    let mut second = DeploymentAttempt::new("dep-b", "production");
    second.errors.push(ErrorRecord::new(
        ErrorType::Dependency,
        "Module not found: 'left-pad'",
    ));
    let result = finish(&memory, second, DeploymentOutcome::RolledBack);
    assert_eq!(result.patterns_created, 0);
    assert_eq!(result.patterns_extended, 1);

    let entry = memory
        .store()
        .get_known_solution("Module not found: <STR>", ErrorType::Dependency)
        .unwrap()
        .unwrap();
    assert_eq!(entry.occurrences, 2);
    assert_eq!(entry.causes.len(), 2);
    assert_eq!(entry.confidence, 0.1);
    assert!(!entry.verified);
    assert!(!entry.solutions[0].automation_safe);
}

#[test]
fn successful_deployments_do_not_catalog_errors() {
    let memory = memory();
    let mut attempt = DeploymentAttempt::new("dep-ok", "production");
    attempt
        .errors
        .push(ErrorRecord::new(ErrorType::Build, "warning treated as error"));
    let result = finish(&memory, attempt, DeploymentOutcome::Success);
    assert_eq!(result.patterns_created, 0);
    assert!(memory
        .store()
        .get_known_solution("warning treated as error", ErrorType::Build)
        .unwrap()
        .is_none());
}

#[test]
fn unseen_configuration_predicts_default() {
    let memory = memory();
    let mut snap = pinned_snapshot();
    snap.risk_factors
        .push(RiskFactor::new("debug_statements", Severity::Low, "x"));
    let prediction = memory.predict_success_rate(&snap).unwrap();
    assert_eq!(prediction.sample_size, 0);
    assert_eq!(prediction.success_rate, 0.5);
    assert_eq!(prediction.risk_factors.len(), 1);
    assert_eq!(prediction.recommendations.len(), 1);
}

#[test]
fn history_baseline_minus_distinct_risks() {
    let memory = memory();
    let snap = pinned_snapshot();
    let now = Utc::now();

    // Two fingerprints in the same runtime/framework bucket: 3 of 4 succeeded.
    let mut a = BuildPattern::from_snapshot("fp-a", &snap, now);
    a.record_outcome(true, Some(60.0), now);
    a.record_outcome(true, None, now);
    let mut b = BuildPattern::from_snapshot("fp-b", &snap, now);
    b.record_outcome(true, None, now);
    b.record_outcome(false, None, now);
    memory.store().upsert_build_pattern(&a).unwrap();
    memory.store().upsert_build_pattern(&b).unwrap();

    let clean = memory.predict_success_rate(&snap).unwrap();
    assert_eq!(clean.sample_size, 4);
    assert_eq!(clean.baseline, 0.75);
    assert_eq!(clean.success_rate, 0.75);

    let mut risky = snap.clone();
    risky.has_lockfile = false;
    risky
        .risk_factors
        .push(RiskFactor::new("large_asset", Severity::Medium, "x"));
    risky
        .risk_factors
        .push(RiskFactor::new("large_asset", Severity::Medium, "y"));
    let prediction = memory.predict_success_rate(&risky).unwrap();
    // large_asset once, missing_lockfile once.
    assert_eq!(prediction.risk_factors.len(), 2);
    assert!((prediction.success_rate - 0.55).abs() < 1e-9);
}

#[test]
fn learning_feeds_prediction() {
    let memory = memory();
    for (i, outcome) in [DeploymentOutcome::Success, DeploymentOutcome::Failed]
        .into_iter()
        .enumerate()
    {
        let mut attempt = DeploymentAttempt::new(format!("dep-{i}"), "production");
        attempt.build_config = pinned_snapshot();
        attempt.build_time_seconds = Some(30.0 * (i + 1) as f64);
        finish(&memory, attempt, outcome);
    }
    let fp = fingerprint(&pinned_snapshot());
    let pattern = memory.store().get_build_pattern(&fp).unwrap().unwrap();
    assert_eq!(pattern.total(), 2);
    assert_eq!(pattern.success_rate, 0.5);
    assert_eq!(pattern.build_time.samples, 2);
    assert_eq!(pattern.build_time.max_seconds, Some(60.0));

    let prediction = memory.predict_success_rate(&pinned_snapshot()).unwrap();
    assert_eq!(prediction.sample_size, 2);
    assert_eq!(prediction.fingerprint, fp);
}

#[test]
fn insights_cover_window() {
    let memory = memory();
    let mut proven = Solution::new("clear cache").with_command("rm -rf .next");
    proven.times_applied = 4;
    proven.times_successful = 4;
    memory
        .register_solution("Build cache corrupted", ErrorType::Build, proven)
        .unwrap();
    let mut unproven = Solution::new("retry").with_command("npm run build");
    unproven.times_applied = 2;
    unproven.times_successful = 2;
    memory
        .register_solution("Build timed out", ErrorType::Build, unproven)
        .unwrap();

    for i in 0..2 {
        let mut attempt = DeploymentAttempt::new(format!("ok-{i}"), "production");
        attempt.duration_seconds = Some(100.0);
        finish(&memory, attempt, DeploymentOutcome::Success);
    }
    let mut failed = DeploymentAttempt::new("bad", "production");
    failed
        .errors
        .push(ErrorRecord::new(ErrorType::Dependency, LODASH));
    finish(&memory, failed, DeploymentOutcome::Failed);

    let insights = memory.get_insights(7).unwrap();
    assert_eq!(insights.window_days, 7);
    assert_eq!(insights.total_deployments(), 3);
    let success = insights
        .by_status
        .iter()
        .find(|s| s.status == DeploymentStatus::Success)
        .unwrap();
    assert_eq!(success.count, 2);
    assert_eq!(success.avg_duration_seconds, Some(100.0));
    assert_eq!(insights.top_error_patterns.len(), 1);
    assert_eq!(insights.top_error_patterns[0].pattern, "Module not found: <STR>");
    assert_eq!(insights.top_solutions.len(), 1);
    assert_eq!(insights.top_solutions[0].solution.description, "clear cache");
}

#[test]
fn failure_insight_reports_history_and_fixes() {
    let memory = memory();
    memory
        .register_solution(
            LODASH,
            ErrorType::Dependency,
            Solution::new("Install the missing module").with_command("npm install"),
        )
        .unwrap();

    let mut earlier = DeploymentAttempt::new("earlier", "production");
    earlier
        .errors
        .push(ErrorRecord::new(ErrorType::Dependency, LODASH));
    finish(&memory, earlier, DeploymentOutcome::Failed);

    let mut attempt = DeploymentAttempt::new("now", "production");
    attempt.phase = deployiq_core::models::DeploymentPhase::Build;
    attempt
        .errors
        .push(ErrorRecord::new(ErrorType::Dependency, LODASH));
    attempt
        .errors
        .push(ErrorRecord::new(ErrorType::Dependency, "Module not found: 'react'"));
    attempt.errors.push(ErrorRecord::new(
        ErrorType::Syntax,
        "Unexpected token in /app/src/index.js:3:9",
    ));
    attempt
        .risk_factors
        .push(RiskFactor::new("missing_lockfile", Severity::Medium, "x"));

    let insight = memory.failure_insight(&attempt).unwrap();
    assert_eq!(insight.failed_phase, "build");
    assert_eq!(insight.patterns.len(), 2);
    assert_eq!(insight.patterns[0].historical_occurrences, 1);
    assert!(insight.patterns[0].has_known_fix);
    assert!(!insight.patterns[1].has_known_fix);
    assert_eq!(insight.recommendations.len(), 3);
    assert!(insight.recommendations[0].contains("Install the missing module"));

    // Raw messages count against their normalized pattern.
    assert_eq!(memory.pattern_frequency("Module not found: 'left-pad'").unwrap(), 1);
    assert_eq!(memory.pattern_frequency("Unexpected token").unwrap(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn learned_success_rate_is_exact_ratio(outcomes in prop::collection::vec(any::<bool>(), 1..10)) {
        let memory = memory();
        let fix = Solution::new("reinstall").with_command("npm ci");
        let fix_id = fix.id.clone();
        memory.register_solution(LODASH, ErrorType::Dependency, fix).unwrap();

        for (i, ok) in outcomes.iter().enumerate() {
            let mut attempt = DeploymentAttempt::new(format!("dep-{i}"), "production");
            attempt.applied_solutions.push(applied(&fix_id, true));
            let outcome = if *ok { DeploymentOutcome::Success } else { DeploymentOutcome::Failed };
            finish(&memory, attempt, outcome);
        }

        let entry = memory
            .store()
            .find_known_solution_by_solution_id(LODASH_PATTERN, &fix_id)
            .unwrap()
            .unwrap();
        let solution = &entry.solutions[0];
        let k = outcomes.len() as u32;
        let s = outcomes.iter().filter(|o| **o).count() as u32;
        prop_assert_eq!(solution.times_applied, k);
        prop_assert_eq!(solution.times_successful, s);
        prop_assert_eq!(solution.success_rate, f64::from(s) / f64::from(k));
        prop_assert!(entry.confidence >= 0.0 && entry.confidence <= 0.95);
    }
}
