//! Top-level error aggregating every subsystem error via `From` conversions.

use super::error_code::{self, DeployErrorCode};
use super::{AnalyzerError, ConfigError, SolutionApplicationError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("solution application error: {0}")]
    Application(#[from] SolutionApplicationError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DeployErrorCode for DeployError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Analyzer(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Application(e) => e.error_code(),
            Self::Internal(_) => error_code::INTERNAL_ERROR,
        }
    }
}

pub type DeployResult<T> = Result<T, DeployError>;
