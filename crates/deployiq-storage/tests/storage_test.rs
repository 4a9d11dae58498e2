//! Store contract tests against both in-memory and file-backed engines.

use chrono::{Duration, Utc};

use deployiq_core::models::{
    BuildConfigSnapshot, BuildPattern, DeploymentAttempt, DeploymentStatus, ErrorRecord,
    ErrorType, KnownSolution, Solution,
};
use deployiq_core::traits::IDeploymentStore;
use deployiq_storage::StorageEngine;

fn attempt_with_error(id: &str, raw: &str) -> DeploymentAttempt {
    let mut attempt = DeploymentAttempt::new(id, "production");
    attempt.errors.push(ErrorRecord::new(ErrorType::Dependency, raw));
    attempt
}

fn proven_solution(applied: u32, successful: u32) -> Solution {
    let mut solution = Solution::new("npm install lodash").automation_safe(true);
    for i in 0..applied {
        solution.record_application(i < successful, Utc::now());
    }
    solution
}

#[test]
fn insert_is_insert_if_absent() {
    let store = StorageEngine::open_in_memory().unwrap();
    let first = DeploymentAttempt::new("dep-1", "production");
    assert!(store.insert_attempt(&first).unwrap());

    let second = DeploymentAttempt::new("dep-1", "staging");
    assert!(!store.insert_attempt(&second).unwrap());

    let stored = store.get_attempt("dep-1").unwrap().unwrap();
    assert_eq!(stored.environment, "production");
}

#[test]
fn missing_attempt_is_none() {
    let store = StorageEngine::open_in_memory().unwrap();
    assert!(store.get_attempt("nope").unwrap().is_none());
}

#[test]
fn upsert_replaces_document_and_error_index() {
    let store = StorageEngine::open_in_memory().unwrap();
    let mut attempt = attempt_with_error("dep-1", "Module not found: 'lodash'");
    store.insert_attempt(&attempt).unwrap();

    attempt.status = DeploymentStatus::Failed;
    attempt.errors.clear();
    attempt
        .errors
        .push(ErrorRecord::new(ErrorType::Build, "Out of memory at line 12"));
    store.upsert_attempt(&attempt).unwrap();

    let stored = store.get_attempt("dep-1").unwrap().unwrap();
    assert_eq!(stored.status, DeploymentStatus::Failed);
    assert_eq!(store.count_attempts_by_error("module not found").unwrap(), 0);
    assert_eq!(store.count_attempts_by_error("out of memory").unwrap(), 1);
}

#[test]
fn error_search_is_case_insensitive_and_newest_first() {
    let store = StorageEngine::open_in_memory().unwrap();
    let mut older = attempt_with_error("dep-old", "Module not found: 'lodash'");
    older.created_at = Utc::now() - Duration::hours(2);
    let newer = attempt_with_error("dep-new", "Module not found: 'react'");
    store.insert_attempt(&older).unwrap();
    store.insert_attempt(&newer).unwrap();
    store
        .insert_attempt(&attempt_with_error("dep-other", "Unexpected token"))
        .unwrap();

    let found = store.find_attempts_by_error("MODULE NOT FOUND", 10).unwrap();
    let ids: Vec<_> = found.iter().map(|a| a.deployment_id.as_str()).collect();
    assert_eq!(ids, vec!["dep-new", "dep-old"]);

    let bounded = store.find_attempts_by_error("module not found", 1).unwrap();
    assert_eq!(bounded.len(), 1);
}

#[test]
fn wildcards_in_search_text_are_literal() {
    let store = StorageEngine::open_in_memory().unwrap();
    store
        .insert_attempt(&attempt_with_error("dep-1", "Module not found: 'lodash'"))
        .unwrap();
    assert_eq!(store.count_attempts_by_error("%").unwrap(), 0);
}

#[test]
fn known_solutions_round_trip_and_search() {
    let store = StorageEngine::open_in_memory().unwrap();
    let mut known = KnownSolution::curated("Module not found: <STR>", ErrorType::Dependency, Utc::now());
    let solution = proven_solution(5, 2);
    let solution_id = solution.id.clone();
    known.solutions.push(solution);
    store.upsert_known_solution(&known).unwrap();

    let fetched = store
        .get_known_solution("Module not found: <STR>", ErrorType::Dependency)
        .unwrap()
        .unwrap();
    assert_eq!(fetched, known);
    assert!(store
        .get_known_solution("Module not found: <STR>", ErrorType::Build)
        .unwrap()
        .is_none());

    let by_id = store
        .find_known_solution_by_solution_id("Module not found: <STR>", &solution_id)
        .unwrap()
        .unwrap();
    assert_eq!(by_id.error_pattern, "Module not found: <STR>");

    let hits = store.search_known_solutions("module not found", None).unwrap();
    assert_eq!(hits.len(), 1);
    let typed = store
        .search_known_solutions("module not found", Some(ErrorType::Syntax))
        .unwrap();
    assert!(typed.is_empty());
}

#[test]
fn one_solution_id_under_two_patterns() {
    let store = StorageEngine::open_in_memory().unwrap();
    let shared = proven_solution(5, 5);
    let shared_id = shared.id.clone();

    let mut missing = KnownSolution::curated("Module not found: <STR>", ErrorType::Dependency, Utc::now());
    missing.solutions.push(shared.clone());
    store.upsert_known_solution(&missing).unwrap();
    let mut peer = KnownSolution::curated("Cannot resolve peer <STR>", ErrorType::Dependency, Utc::now());
    peer.solutions.push(shared);
    store.upsert_known_solution(&peer).unwrap();

    for pattern in ["Module not found: <STR>", "Cannot resolve peer <STR>"] {
        let entry = store
            .find_known_solution_by_solution_id(pattern, &shared_id)
            .unwrap()
            .unwrap();
        assert_eq!(entry.error_pattern, pattern);
    }
    assert!(store
        .find_known_solution_by_solution_id("Unexpected token", &shared_id)
        .unwrap()
        .is_none());
    assert_eq!(store.top_solutions(3, 0.7, 10).unwrap().len(), 2);
}

#[test]
fn upsert_known_solution_drops_removed_solutions() {
    let store = StorageEngine::open_in_memory().unwrap();
    let mut known = KnownSolution::curated("Unexpected token", ErrorType::Syntax, Utc::now());
    let removed = proven_solution(3, 3);
    let removed_id = removed.id.clone();
    known.solutions.push(removed);
    store.upsert_known_solution(&known).unwrap();

    known.solutions.clear();
    known.solutions.push(proven_solution(4, 4));
    store.upsert_known_solution(&known).unwrap();

    assert!(store
        .find_known_solution_by_solution_id("Unexpected token", &removed_id)
        .unwrap()
        .is_none());
}

#[test]
fn top_solutions_filters_and_orders() {
    let store = StorageEngine::open_in_memory().unwrap();
    let mut known = KnownSolution::curated("Build failed", ErrorType::Build, Utc::now());
    known.solutions.push(proven_solution(10, 10)); // effectiveness 10
    known.solutions.push(proven_solution(10, 7)); // rate 0.7, kept
    known.solutions.push(proven_solution(10, 6)); // rate 0.6, dropped
    known.solutions.push(proven_solution(2, 2)); // too few applications
    store.upsert_known_solution(&known).unwrap();

    let top = store.top_solutions(3, 0.7, 10).unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].solution.success_rate, 1.0);
    assert!(top[0].solution.effectiveness >= top[1].solution.effectiveness);
    assert_eq!(top[1].error_type, ErrorType::Build);
}

#[test]
fn build_patterns_match_on_versions_including_unknown() {
    let store = StorageEngine::open_in_memory().unwrap();
    let snapshot = BuildConfigSnapshot {
        runtime_version: Some("20".to_string()),
        ..Default::default()
    };
    let mut pattern = BuildPattern::from_snapshot("fp-1", &snapshot, Utc::now());
    pattern.record_outcome(true, Some(42.0), Utc::now());
    store.upsert_build_pattern(&pattern).unwrap();

    assert_eq!(store.get_build_pattern("fp-1").unwrap(), Some(pattern.clone()));
    assert_eq!(store.find_build_patterns(Some("20"), None).unwrap().len(), 1);
    assert!(store.find_build_patterns(Some("18"), None).unwrap().is_empty());
    assert!(store.find_build_patterns(Some("20"), Some("14.0.0")).unwrap().is_empty());

    pattern.record_outcome(false, None, Utc::now());
    store.upsert_build_pattern(&pattern).unwrap();
    let stored = store.get_build_pattern("fp-1").unwrap().unwrap();
    assert_eq!(stored.total(), 2);
    assert_eq!(stored.success_rate, 0.5);
}

#[test]
fn aggregations_respect_the_time_window() {
    let store = StorageEngine::open_in_memory().unwrap();
    let mut ok = DeploymentAttempt::new("dep-ok", "production");
    ok.status = DeploymentStatus::Success;
    ok.duration_seconds = Some(100.0);
    ok.build_time_seconds = Some(40.0);
    let mut failed = attempt_with_error("dep-failed", "Module not found: 'a'");
    failed.status = DeploymentStatus::Failed;
    failed.errors.push(ErrorRecord::new(ErrorType::Dependency, "Module not found: 'b'"));
    let mut ancient = attempt_with_error("dep-ancient", "Module not found: 'c'");
    ancient.status = DeploymentStatus::Failed;
    ancient.created_at = Utc::now() - Duration::days(90);
    for attempt in [&ok, &failed, &ancient] {
        store.insert_attempt(attempt).unwrap();
    }

    let since = Utc::now() - Duration::days(30);
    let summary = store.status_summary(since).unwrap();
    assert_eq!(summary.len(), 2);
    let success = summary
        .iter()
        .find(|s| s.status == DeploymentStatus::Success)
        .unwrap();
    assert_eq!(success.count, 1);
    assert_eq!(success.avg_duration_seconds, Some(100.0));
    let failed_row = summary
        .iter()
        .find(|s| s.status == DeploymentStatus::Failed)
        .unwrap();
    assert_eq!(failed_row.count, 1);
    assert_eq!(failed_row.avg_duration_seconds, None);

    let patterns = store.top_error_patterns(since, 10).unwrap();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].pattern, "Module not found: <STR>");
    assert_eq!(patterns[0].count, 2);

    assert_eq!(store.query_attempts_since(since, 10).unwrap().len(), 2);
}

#[test]
fn file_backed_readers_see_committed_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = StorageEngine::open(&dir.path().join("deployiq.db")).unwrap();
    assert!(store.pool().readers.is_some());

    store
        .insert_attempt(&attempt_with_error("dep-1", "Unexpected token"))
        .unwrap();
    for _ in 0..8 {
        // Round-robin touches every reader.
        assert!(store.get_attempt("dep-1").unwrap().is_some());
    }
    store
        .pool()
        .writer
        .with_conn(|conn| {
            assert!(deployiq_storage::pool::pragmas::verify_wal_mode(conn)?);
            Ok(())
        })
        .unwrap();
}

#[test]
fn reopening_a_database_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deployiq.db");
    {
        let store = StorageEngine::open(&path).unwrap();
        store
            .insert_attempt(&DeploymentAttempt::new("dep-1", "preview"))
            .unwrap();
    }
    let store = StorageEngine::open(&path).unwrap();
    assert_eq!(
        store.get_attempt("dep-1").unwrap().unwrap().environment,
        "preview"
    );
}
