//! Error handling for DeployIQ.
//! One error enum per subsystem, `thiserror` only, aggregated by `DeployError`.

pub mod analyzer_error;
pub mod application_error;
pub mod config_error;
pub mod deploy_error;
pub mod error_code;
pub mod storage_error;

pub use analyzer_error::AnalyzerError;
pub use application_error::SolutionApplicationError;
pub use config_error::ConfigError;
pub use deploy_error::{DeployError, DeployResult};
pub use error_code::DeployErrorCode;
pub use storage_error::StorageError;
