//! # deployiq-memory
//!
//! The knowledge side of the pipeline. Persists deployment attempts, ranks
//! known fixes for an error, predicts success from build-pattern history,
//! and folds every finished deployment back into the knowledge base.

pub mod engine;
pub mod insights;
pub mod learning;
pub mod prediction;
pub mod ranking;

pub use engine::DeploymentMemory;
