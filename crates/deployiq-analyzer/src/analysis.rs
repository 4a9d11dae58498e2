//! The analyzer's output and its confidence heuristic.

use serde::{Deserialize, Serialize};

use deployiq_core::constants::{DEFAULT_SUCCESS_RATE, MAX_CONFIDENCE, MIN_PREDICTED_RATE, RISK_PENALTY};
use deployiq_core::models::{BuildConfigSnapshot, RiskFactor};
use deployiq_core::traits::SourceFile;

use crate::code_scan::CodeQualityReport;
use crate::dependency_audit::DependencyAudit;

const BASE_CONFIDENCE: f64 = 0.5;
const SIGNAL_BONUS: f64 = 0.1;
const LOW_SEED_PENALTY: f64 = 0.2;
const MANY_RISKS_PENALTY: f64 = 0.1;
const MANY_RISKS: usize = 3;
const MIN_CONFIDENCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildAnalysis {
    pub snapshot: BuildConfigSnapshot,
    pub fingerprint: String,
    pub dependency_audit: DependencyAudit,
    pub code_quality: CodeQualityReport,
    pub large_assets: Vec<SourceFile>,
    /// Distinct by code.
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
    /// Static success-rate estimate before any history is consulted.
    pub success_seed: f64,
    pub confidence: f64,
}

impl BuildAnalysis {
    /// `max(0.1, 0.5 − 0.1 × distinct risk factors)`.
    pub fn seed_for(risk_count: usize) -> f64 {
        (DEFAULT_SUCCESS_RATE - RISK_PENALTY * risk_count as f64).max(MIN_PREDICTED_RATE)
    }

    /// Confidence in an analysis whose success rate is `seed`.
    pub fn confidence_for(&self, seed: f64) -> f64 {
        let risk_count = self.risk_factors.len();
        let signals = [
            self.snapshot.commit_hash.is_some(),
            !self.snapshot.dependencies.is_empty(),
            self.snapshot.typed_source,
            self.dependency_audit.audited && self.dependency_audit.finding_count() == 0,
            risk_count == 0,
        ];
        let mut confidence =
            BASE_CONFIDENCE + SIGNAL_BONUS * signals.iter().filter(|s| **s).count() as f64;
        if seed < 0.5 {
            confidence -= LOW_SEED_PENALTY;
        }
        if risk_count > MANY_RISKS {
            confidence -= MANY_RISKS_PENALTY;
        }
        confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }

    /// Replace the static seed with a history-based rate.
    pub fn apply_seed(&mut self, rate: f64) {
        self.success_seed = rate;
        self.confidence = self.confidence_for(rate);
    }
}
