//! Feedback loop: fold a finished deployment into solutions, build patterns,
//! and the known-error catalog.
//!
//! Each collection is written with its own upsert. A crash between writes
//! leaves `learned_at` unset, so a later pass may count the earlier writes
//! twice; single-attempt double counting is the accepted cost of not holding
//! a cross-collection transaction.

use chrono::{DateTime, Utc};

use deployiq_core::config::MemoryConfig;
use deployiq_core::learning_span;
use deployiq_core::models::{
    AttemptUpdate, BuildPattern, DeploymentAttempt, DeploymentOutcome, KnownSolution,
    LearningResult,
};
use deployiq_core::patterns::fingerprint;
use deployiq_core::traits::{IDeploymentStore, StoreResult};

pub fn learn(
    store: &dyn IDeploymentStore,
    config: &MemoryConfig,
    deployment_id: &str,
    outcome: DeploymentOutcome,
    now: DateTime<Utc>,
) -> StoreResult<LearningResult> {
    let _span = learning_span!(deployment_id, outcome).entered();
    let mut result = LearningResult {
        deployment_id: deployment_id.to_string(),
        ..Default::default()
    };

    let Some(mut attempt) = store.get_attempt(deployment_id)? else {
        tracing::warn!(deployment_id, "learning skipped: unknown deployment");
        return Ok(result);
    };
    if attempt.learned_at.is_some() {
        tracing::debug!(deployment_id, "learning skipped: already learned");
        return Ok(result);
    }

    result.solutions_updated = update_solutions(store, config, &attempt, outcome, now)?;
    result.build_pattern_rate = Some(update_build_pattern(store, &attempt, outcome, now)?);
    if !outcome.is_success() {
        let (created, extended) = catalog_errors(store, &attempt, now)?;
        result.patterns_created = created;
        result.patterns_extended = extended;
    }

    let stamp = AttemptUpdate {
        learned_at: Some(now),
        ..Default::default()
    };
    attempt.apply_update(&stamp, now);
    store.upsert_attempt(&attempt)?;
    result.applied = true;

    tracing::info!(
        solutions_updated = result.solutions_updated,
        patterns_created = result.patterns_created,
        patterns_extended = result.patterns_extended,
        "outcome learned"
    );
    Ok(result)
}

/// An application counts as successful only if its steps all ran and the
/// deployment itself succeeded.
fn update_solutions(
    store: &dyn IDeploymentStore,
    config: &MemoryConfig,
    attempt: &DeploymentAttempt,
    outcome: DeploymentOutcome,
    now: DateTime<Utc>,
) -> StoreResult<usize> {
    let mut updated = 0;
    for applied in &attempt.applied_solutions {
        let found =
            store.find_known_solution_by_solution_id(&applied.error_pattern, &applied.solution_id)?;
        let Some(mut entry) = found else {
            tracing::warn!(
                solution_id = %applied.solution_id,
                pattern = %applied.error_pattern,
                "applied solution no longer stored"
            );
            continue;
        };
        let succeeded = applied.success && outcome.is_success();
        let Some(solution) = entry.solution_mut(&applied.solution_id) else {
            continue;
        };
        solution.record_application(succeeded, now);
        let delta = if succeeded {
            config.confidence_step
        } else {
            -config.confidence_step
        };
        entry.adjust_confidence(delta);
        entry.updated_at = now;
        store.upsert_known_solution(&entry)?;
        updated += 1;
    }
    Ok(updated)
}

fn update_build_pattern(
    store: &dyn IDeploymentStore,
    attempt: &DeploymentAttempt,
    outcome: DeploymentOutcome,
    now: DateTime<Utc>,
) -> StoreResult<f64> {
    let fp = if attempt.config_fingerprint.is_empty() {
        fingerprint(&attempt.build_config)
    } else {
        attempt.config_fingerprint.clone()
    };
    let mut pattern = match store.get_build_pattern(&fp)? {
        Some(existing) => existing,
        None => BuildPattern::from_snapshot(fp, &attempt.build_config, now),
    };
    pattern.record_outcome(outcome.is_success(), attempt.build_time_seconds, now);
    store.upsert_build_pattern(&pattern)?;
    Ok(pattern.success_rate)
}

/// Returns `(created, extended)` entry counts.
fn catalog_errors(
    store: &dyn IDeploymentStore,
    attempt: &DeploymentAttempt,
    now: DateTime<Utc>,
) -> StoreResult<(usize, usize)> {
    let (mut created, mut extended) = (0, 0);
    for error in &attempt.errors {
        let entry = match store.get_known_solution(&error.normalized_pattern, error.error_type)? {
            Some(mut existing) => {
                existing.record_cause(&error.raw_message, now);
                extended += 1;
                existing
            }
            None => {
                created += 1;
                KnownSolution::discovered(
                    error.normalized_pattern.clone(),
                    error.error_type,
                    &error.raw_message,
                    now,
                )
            }
        };
        store.upsert_known_solution(&entry)?;
    }
    Ok((created, extended))
}
