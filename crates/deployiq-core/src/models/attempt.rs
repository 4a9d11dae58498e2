use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AppliedSolution, BuildConfigSnapshot, DeploymentOutcome, DeploymentPhase, DeploymentStatus,
    ErrorRecord, RiskFactor,
};

/// One monitored deployment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentAttempt {
    pub deployment_id: String,
    pub environment: String,
    pub status: DeploymentStatus,
    pub phase: DeploymentPhase,
    pub build_config: BuildConfigSnapshot,
    pub config_fingerprint: String,
    pub errors: Vec<ErrorRecord>,
    pub applied_solutions: Vec<AppliedSolution>,
    pub risk_factors: Vec<RiskFactor>,
    pub predicted_success_rate: f64,
    pub confidence: f64,
    pub duration_seconds: Option<f64>,
    pub build_time_seconds: Option<f64>,
    pub deploy_time_seconds: Option<f64>,
    pub actual_outcome: Option<DeploymentOutcome>,
    /// 1 when the prediction (rate > 0.5) agreed with the outcome, else 0.
    pub prediction_accuracy: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set once the learning step has consumed this attempt.
    pub learned_at: Option<DateTime<Utc>>,
}

impl DeploymentAttempt {
    /// A fresh pending attempt. An empty id is replaced when logged.
    pub fn new(deployment_id: impl Into<String>, environment: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            deployment_id: deployment_id.into(),
            environment: environment.into(),
            status: DeploymentStatus::Pending,
            phase: DeploymentPhase::Validation,
            build_config: BuildConfigSnapshot::default(),
            config_fingerprint: String::new(),
            errors: Vec::new(),
            applied_solutions: Vec::new(),
            risk_factors: Vec::new(),
            predicted_success_rate: 0.0,
            confidence: 0.0,
            duration_seconds: None,
            build_time_seconds: None,
            deploy_time_seconds: None,
            actual_outcome: None,
            prediction_accuracy: None,
            created_at: now,
            updated_at: now,
            started_at: now,
            completed_at: None,
            learned_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Merge an update. Terminal attempts only accept the learning stamp, and
    /// the phase only ever moves forward. Returns whether anything changed.
    pub fn apply_update(&mut self, update: &AttemptUpdate, now: DateTime<Utc>) -> bool {
        if self.is_terminal() {
            if let (None, Some(at)) = (self.learned_at, update.learned_at) {
                self.learned_at = Some(at);
                self.updated_at = now;
                return true;
            }
            return false;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(phase) = update.phase {
            if phase > self.phase {
                self.phase = phase;
            }
        }
        if update.build_time_seconds.is_some() {
            self.build_time_seconds = update.build_time_seconds;
        }
        if update.deploy_time_seconds.is_some() {
            self.deploy_time_seconds = update.deploy_time_seconds;
        }
        if update.duration_seconds.is_some() {
            self.duration_seconds = update.duration_seconds;
        }
        if update.actual_outcome.is_some() {
            self.actual_outcome = update.actual_outcome;
        }
        if update.prediction_accuracy.is_some() {
            self.prediction_accuracy = update.prediction_accuracy;
        }
        if update.completed_at.is_some() {
            self.completed_at = update.completed_at;
        }
        if update.learned_at.is_some() {
            self.learned_at = update.learned_at;
        }
        self.updated_at = now;
        true
    }
}

/// Partial update merged into a stored attempt. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptUpdate {
    pub status: Option<DeploymentStatus>,
    pub phase: Option<DeploymentPhase>,
    pub build_time_seconds: Option<f64>,
    pub deploy_time_seconds: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub actual_outcome: Option<DeploymentOutcome>,
    pub prediction_accuracy: Option<u8>,
    pub completed_at: Option<DateTime<Utc>>,
    pub learned_at: Option<DateTime<Utc>>,
}
