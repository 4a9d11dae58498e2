//! Span definitions per operation: analysis, prediction, learning, resolution, monitoring.

/// Create an analysis span.
#[macro_export]
macro_rules! analysis_span {
    ($root:expr) => {
        tracing::info_span!("deployiq.analysis", root = %$root)
    };
}

/// Create a prediction span.
#[macro_export]
macro_rules! prediction_span {
    ($fingerprint:expr) => {
        tracing::info_span!("deployiq.prediction", fingerprint = %$fingerprint)
    };
}

/// Create a learning span.
#[macro_export]
macro_rules! learning_span {
    ($deployment_id:expr, $outcome:expr) => {
        tracing::info_span!("deployiq.learning", deployment_id = %$deployment_id, outcome = ?$outcome)
    };
}

/// Create a resolution span.
#[macro_export]
macro_rules! resolution_span {
    ($pattern:expr) => {
        tracing::info_span!("deployiq.resolution", pattern = %$pattern)
    };
}

/// Create a monitoring span for one deployment.
#[macro_export]
macro_rules! monitor_span {
    ($deployment_id:expr) => {
        tracing::info_span!("deployiq.monitor", deployment_id = %$deployment_id)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const ANALYSIS: &str = "deployiq.analysis";
    pub const PREDICTION: &str = "deployiq.prediction";
    pub const LEARNING: &str = "deployiq.learning";
    pub const RESOLUTION: &str = "deployiq.resolution";
    pub const MONITOR: &str = "deployiq.monitor";
}
