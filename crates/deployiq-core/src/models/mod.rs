//! Record types persisted by the store and exchanged between components.

pub mod attempt;
pub mod build;
pub mod error_record;
pub mod insights;
pub mod prediction;
pub mod solution;
pub mod status;

pub use attempt::{AttemptUpdate, DeploymentAttempt};
pub use build::{
    distinct_risks, recommendation_for, BuildConfigSnapshot, BuildPattern, BuildTimeStats, RiskFactor, Severity,
};
pub use error_record::ErrorRecord;
pub use insights::{
    DeploymentInsights, ErrorPatternCount, FailureInsight, PatternFrequency, StatusSummary,
};
pub use prediction::{LearningResult, SuccessPrediction};
pub use solution::{
    effectiveness_score, AppliedSolution, FileAction, FileChange, KnownSolution, RankedSolution,
    Solution,
};
pub use status::{DeploymentOutcome, DeploymentPhase, DeploymentStatus, ErrorType};
