use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ErrorType;
use crate::patterns::normalize_error;

/// One error observed during a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub file: Option<String>,
    pub error_type: ErrorType,
    pub raw_message: String,
    /// Placeholder-substituted form of `raw_message`, the knowledge-base key.
    pub normalized_pattern: String,
    pub line_number: Option<u32>,
    pub reported_at: DateTime<Utc>,
    pub resolved: bool,
    pub auto_fixed: bool,
    pub time_to_resolution_minutes: Option<f64>,
}

impl ErrorRecord {
    /// Build a record, deriving the normalized pattern from the raw message.
    pub fn new(error_type: ErrorType, raw_message: impl Into<String>) -> Self {
        let raw_message = raw_message.into();
        Self {
            file: None,
            error_type,
            normalized_pattern: normalize_error(&raw_message),
            raw_message,
            line_number: None,
            reported_at: Utc::now(),
            resolved: false,
            auto_fixed: false,
            time_to_resolution_minutes: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line_number = Some(line);
        self
    }

    /// Mark resolved at `at`, recording minutes elapsed since the report.
    pub fn mark_resolved(&mut self, at: DateTime<Utc>, auto_fixed: bool) {
        if self.resolved {
            return;
        }
        self.resolved = true;
        self.auto_fixed = auto_fixed;
        let elapsed = (at - self.reported_at).num_milliseconds().max(0) as f64;
        self.time_to_resolution_minutes = Some(elapsed / 60_000.0);
    }
}
