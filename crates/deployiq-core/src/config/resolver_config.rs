use serde::{Deserialize, Serialize};

use super::defaults;

/// Candidate scoring weights and confidence bonuses.
///
/// `score = effectiveness·w_e + success_rate·w_s + recency·w_r + safe·bonus`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub effectiveness_weight: f64,
    pub success_rate_weight: f64,
    pub recency_weight: f64,
    pub automation_safe_bonus: f64,
    pub recency_window_days: f64,
    /// More than this many similar cases earns `many_cases_bonus`.
    pub many_cases_threshold: usize,
    pub many_cases_bonus: f64,
    /// More than this many similar cases earns `some_cases_bonus`.
    pub some_cases_threshold: usize,
    pub some_cases_bonus: f64,
    pub confidence_cap: f64,
    pub similar_lookup_limit: usize,
    /// Candidates at or below this effectiveness are not considered.
    pub min_candidate_effectiveness: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            effectiveness_weight: defaults::DEFAULT_EFFECTIVENESS_WEIGHT,
            success_rate_weight: defaults::DEFAULT_SUCCESS_RATE_WEIGHT,
            recency_weight: defaults::DEFAULT_RECENCY_WEIGHT,
            automation_safe_bonus: defaults::DEFAULT_AUTOMATION_SAFE_BONUS,
            recency_window_days: defaults::DEFAULT_RECENCY_WINDOW_DAYS,
            many_cases_threshold: defaults::DEFAULT_MANY_CASES_THRESHOLD,
            many_cases_bonus: defaults::DEFAULT_MANY_CASES_BONUS,
            some_cases_threshold: defaults::DEFAULT_SOME_CASES_THRESHOLD,
            some_cases_bonus: defaults::DEFAULT_SOME_CASES_BONUS,
            confidence_cap: defaults::DEFAULT_CONFIDENCE_CAP,
            similar_lookup_limit: defaults::DEFAULT_SIMILAR_LOOKUP_LIMIT,
            min_candidate_effectiveness: defaults::DEFAULT_MIN_CANDIDATE_EFFECTIVENESS,
        }
    }
}
