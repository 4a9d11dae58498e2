//! DeployErrorCode trait for outer surfaces (dashboards, pipeline logs).

/// Every error enum implements this to expose a stable, machine-readable code.
pub trait DeployErrorCode {
    /// Returns the error code string (e.g., "STORAGE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const MISSING_STORE: &str = "MISSING_STORE";
pub const ANALYZER_ERROR: &str = "ANALYZER_ERROR";
pub const ROOT_INACCESSIBLE: &str = "ROOT_INACCESSIBLE";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const SOLUTION_APPLICATION_ERROR: &str = "SOLUTION_APPLICATION_ERROR";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
