//! # deployiq-analyzer
//!
//! Inspects a project checkout before a deployment starts and produces the
//! configuration snapshot that keys the build-pattern history, plus static
//! risk factors, recommendations, and a success-rate seed.

pub mod analysis;
pub mod analyzer;
pub mod asset_scan;
pub mod code_scan;
pub mod dependency_audit;
pub mod fs_source;
pub mod manifest;
pub mod snapshot;

pub use analysis::BuildAnalysis;
pub use analyzer::BuildAnalyzer;
pub use fs_source::FsProjectSource;
