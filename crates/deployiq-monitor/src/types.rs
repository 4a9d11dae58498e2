//! Requests into and reports out of the monitor.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use deployiq_core::models::{
    DeploymentAttempt, DeploymentOutcome, DeploymentPhase, DeploymentStatus, ErrorType,
    FailureInsight, LearningResult, RiskFactor,
};
use deployiq_resolver::{ApplicationReport, Resolution};

/// Start a monitored deployment of the project at `project_root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    /// Generated when absent.
    pub deployment_id: Option<String>,
    pub environment: String,
    pub project_root: PathBuf,
}

impl DeploymentRequest {
    pub fn new(environment: impl Into<String>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            deployment_id: None,
            environment: environment.into(),
            project_root: project_root.into(),
        }
    }

    pub fn with_id(mut self, deployment_id: impl Into<String>) -> Self {
        self.deployment_id = Some(deployment_id.into());
        self
    }
}

/// What the caller learns up front about a new deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBundle {
    pub deployment_id: String,
    pub fingerprint: String,
    pub predicted_success_rate: f64,
    pub confidence: f64,
    /// Past deployments in the same runtime/framework bucket.
    pub sample_size: u32,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
}

/// An error raised by the pipeline for a live deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_type: ErrorType,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl ErrorReport {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            file: None,
            line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorReportOutcome {
    /// Unknown or already finished deployment.
    Ignored,
    /// Stored, no known fix.
    Recorded { error_index: usize, pattern: String },
    /// A fix exists but did not clear the confidence bar.
    Suggested {
        error_index: usize,
        resolution: Resolution,
    },
    /// A fix was attempted unattended. `report.success` says how it went.
    AutoApplied {
        error_index: usize,
        resolution: Resolution,
        report: ApplicationReport,
    },
}

/// Timings carried along with a phase change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseUpdate {
    pub build_time_seconds: Option<f64>,
    pub deploy_time_seconds: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    Advanced {
        from: DeploymentPhase,
        to: DeploymentPhase,
    },
    /// Same phase again; extras merged.
    Unchanged,
    /// Lower phase requested, or the deployment already finished. Nothing persisted.
    Rejected {
        current: DeploymentPhase,
        requested: DeploymentPhase,
    },
    Unknown,
}

/// Final timings supplied by the pipeline. Missing duration is measured from
/// the start of monitoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionMetrics {
    pub duration_seconds: Option<f64>,
    pub build_time_seconds: Option<f64>,
    pub deploy_time_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub deployment_id: String,
    pub outcome: DeploymentOutcome,
    pub predicted_success_rate: f64,
    pub prediction_accuracy: u8,
    pub duration_seconds: f64,
    /// Whether the terminal state reached the store.
    pub persisted: bool,
    pub learning: Option<LearningResult>,
    /// Present for failed and rolled back deployments.
    pub failure_insight: Option<FailureInsight>,
}

/// Read-only projection of a live deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStatusView {
    pub deployment_id: String,
    pub environment: String,
    pub status: DeploymentStatus,
    pub phase: DeploymentPhase,
    pub stage: String,
    pub predicted_success_rate: f64,
    pub confidence: f64,
    pub error_count: usize,
    pub unresolved_errors: usize,
    pub applied_solutions: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed_seconds: f64,
}

impl DeploymentStatusView {
    pub fn project(attempt: &DeploymentAttempt, now: DateTime<Utc>) -> Self {
        Self {
            deployment_id: attempt.deployment_id.clone(),
            environment: attempt.environment.clone(),
            status: attempt.status,
            phase: attempt.phase,
            stage: attempt.phase.stage_name().to_string(),
            predicted_success_rate: attempt.predicted_success_rate,
            confidence: attempt.confidence,
            error_count: attempt.errors.len(),
            unresolved_errors: attempt.errors.iter().filter(|e| !e.resolved).count(),
            applied_solutions: attempt.applied_solutions.len(),
            started_at: attempt.started_at,
            elapsed_seconds: (now - attempt.started_at).num_milliseconds().max(0) as f64 / 1000.0,
        }
    }
}
