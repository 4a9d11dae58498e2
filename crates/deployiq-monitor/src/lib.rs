//! # deployiq-monitor
//!
//! Tracks each live deployment from analysis to a terminal outcome, routes
//! reported errors through the resolver, and hands the finished attempt to
//! memory so the next prediction knows how this one went.

pub mod active;
pub mod builder;
pub mod monitor;
pub mod retry;
pub mod types;

pub use builder::BuildMonitorBuilder;
pub use monitor::BuildMonitor;
pub use types::{
    CompletionMetrics, CompletionReport, DeploymentRequest, DeploymentStatusView, ErrorReport,
    ErrorReportOutcome, PhaseTransition, PhaseUpdate, PredictionBundle,
};
