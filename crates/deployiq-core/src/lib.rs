//! # deployiq-core
//!
//! Foundation crate for the DeployIQ deployment-intelligence pipeline.
//! Defines the record types, traits, errors, config, and constants, plus the
//! two shared algorithms every other crate leans on: error-pattern
//! normalization and build-config fingerprinting.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod patterns;
pub mod traits;
pub mod tracing_setup;

// Re-export the most commonly used types at the crate root.
pub use config::DeployIqConfig;
pub use errors::{DeployError, DeployResult};
pub use models::{
    AppliedSolution, BuildConfigSnapshot, BuildPattern, DeploymentAttempt, DeploymentPhase,
    DeploymentStatus, ErrorRecord, ErrorType, KnownSolution, RiskFactor, Severity, Solution,
};
pub use patterns::{fingerprint, normalize_error};
