//! Windowed dashboards and per-failure reports.

use chrono::{DateTime, Duration, Utc};

use deployiq_core::config::MemoryConfig;
use deployiq_core::models::{
    recommendation_for, DeploymentAttempt, DeploymentInsights, ErrorType, FailureInsight,
    KnownSolution, PatternFrequency,
};
use deployiq_core::traits::{IDeploymentStore, StoreResult};

pub fn window_insights(
    store: &dyn IDeploymentStore,
    config: &MemoryConfig,
    window_days: u32,
    now: DateTime<Utc>,
) -> StoreResult<DeploymentInsights> {
    let since = now - Duration::days(i64::from(window_days));
    Ok(DeploymentInsights {
        window_days,
        generated_at: now,
        by_status: store.status_summary(since)?,
        top_error_patterns: store.top_error_patterns(since, config.insight_top_n)?,
        top_solutions: store.top_solutions(
            config.top_solution_min_applied,
            config.top_solution_min_success_rate,
            config.insight_top_n,
        )?,
    })
}

/// A fix has steps to run, has worked before, or was reviewed by a human.
/// Investigation placeholders hold none of these.
pub fn has_known_fix(entry: &KnownSolution) -> bool {
    entry.verified
        || entry
            .solutions
            .iter()
            .any(|s| s.times_successful > 0 || s.step_count() > 0)
}

/// Attempts whose errors contain the normalized `pattern`.
pub fn pattern_frequency(store: &dyn IDeploymentStore, pattern: &str) -> StoreResult<usize> {
    store.count_attempts_by_error(pattern)
}

pub fn failure_insight(
    store: &dyn IDeploymentStore,
    attempt: &DeploymentAttempt,
    now: DateTime<Utc>,
) -> StoreResult<FailureInsight> {
    let mut seen: Vec<(&str, ErrorType)> = Vec::new();
    let mut patterns = Vec::new();
    let mut recommendations = Vec::new();

    for error in &attempt.errors {
        let key = (error.normalized_pattern.as_str(), error.error_type);
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        let historical_occurrences = pattern_frequency(store, &error.normalized_pattern)?;
        let entry = store.get_known_solution(&error.normalized_pattern, error.error_type)?;
        let fix = entry.as_ref().filter(|e| has_known_fix(e));
        match fix.and_then(best_solution_description) {
            Some(description) => recommendations.push(format!(
                "Known fix for `{}`: {description}",
                error.normalized_pattern
            )),
            None => recommendations.push(format!(
                "Investigate {} error `{}` (seen in {historical_occurrences} deployments)",
                error.error_type, error.normalized_pattern
            )),
        }
        patterns.push(PatternFrequency {
            pattern: error.normalized_pattern.clone(),
            error_type: error.error_type,
            historical_occurrences,
            has_known_fix: fix.is_some(),
        });
    }

    recommendations.extend(
        attempt
            .risk_factors
            .iter()
            .filter_map(|r| recommendation_for(&r.code))
            .map(str::to_string),
    );

    Ok(FailureInsight {
        deployment_id: attempt.deployment_id.clone(),
        environment: attempt.environment.clone(),
        failed_phase: attempt.phase.stage_name().to_string(),
        patterns,
        recommendations,
        generated_at: now,
    })
}

fn best_solution_description(entry: &KnownSolution) -> Option<String> {
    entry
        .solutions
        .iter()
        .max_by(|a, b| a.effectiveness.total_cmp(&b.effectiveness))
        .map(|s| s.description.clone())
}
