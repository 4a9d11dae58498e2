/// Fire-and-forget analytics. Callers ignore the result; a failing sink must
/// never affect a deployment.
pub trait IAnalyticsSink: Send + Sync {
    fn track(&self, event: &str, properties: &serde_json::Value) -> Result<(), String>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAnalytics;

impl IAnalyticsSink for NoOpAnalytics {
    fn track(&self, _event: &str, _properties: &serde_json::Value) -> Result<(), String> {
        Ok(())
    }
}

/// Emits each event as a structured `tracing` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl IAnalyticsSink for TracingAnalytics {
    fn track(&self, event: &str, properties: &serde_json::Value) -> Result<(), String> {
        tracing::info!(target: "deployiq.analytics", event, properties = %properties, "analytics event");
        Ok(())
    }
}
