//! Configuration errors. Fatal at startup.

use super::error_code::{self, DeployErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config at {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("required service handle missing: {component}")]
    MissingStore { component: String },
}

impl DeployErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingStore { .. } => error_code::MISSING_STORE,
            _ => error_code::CONFIG_ERROR,
        }
    }
}
