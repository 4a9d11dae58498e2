//! Read-side projections for dashboards and failure reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DeploymentStatus, ErrorType, RankedSolution};

/// Per-status aggregate over the insight window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub status: DeploymentStatus,
    pub count: u64,
    pub avg_duration_seconds: Option<f64>,
    pub avg_build_time_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPatternCount {
    pub pattern: String,
    pub error_type: ErrorType,
    pub count: u64,
}

/// Trailing-window summary returned by `get_insights`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentInsights {
    pub window_days: u32,
    pub generated_at: DateTime<Utc>,
    pub by_status: Vec<StatusSummary>,
    pub top_error_patterns: Vec<ErrorPatternCount>,
    pub top_solutions: Vec<RankedSolution>,
}

impl DeploymentInsights {
    pub fn total_deployments(&self) -> u64 {
        self.by_status.iter().map(|s| s.count).sum()
    }
}

/// Historical frequency of one error pattern seen in a failed deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFrequency {
    pub pattern: String,
    pub error_type: ErrorType,
    pub historical_occurrences: usize,
    pub has_known_fix: bool,
}

/// Produced when a deployment ends in failure or rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureInsight {
    pub deployment_id: String,
    pub environment: String,
    pub failed_phase: String,
    pub patterns: Vec<PatternFrequency>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}
