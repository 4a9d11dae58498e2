use serde::{Deserialize, Serialize};

use super::RiskFactor;

/// History-informed success estimate for a build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessPrediction {
    pub fingerprint: String,
    /// Ratio from matching build patterns, or the default with no history.
    pub baseline: f64,
    /// Deployments the baseline was computed from.
    pub sample_size: u32,
    pub success_rate: f64,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
}

/// What one `learn_from_outcome` pass changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningResult {
    pub deployment_id: String,
    /// False when the attempt was unknown or already learned from.
    pub applied: bool,
    pub solutions_updated: usize,
    pub patterns_created: usize,
    pub patterns_extended: usize,
    pub build_pattern_rate: Option<f64>,
}
