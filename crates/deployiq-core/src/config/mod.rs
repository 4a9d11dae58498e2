//! Configuration system for DeployIQ.
//! TOML-based, layered: env > project > user > defaults.

pub mod analyzer_config;
pub mod defaults;
pub mod deployiq_config;
pub mod memory_config;
pub mod monitor_config;
pub mod observability_config;
pub mod resolver_config;
pub mod storage_config;

pub use analyzer_config::AnalyzerConfig;
pub use deployiq_config::DeployIqConfig;
pub use memory_config::MemoryConfig;
pub use monitor_config::{MonitorConfig, RetryPolicy};
pub use observability_config::ObservabilityConfig;
pub use resolver_config::ResolverConfig;
pub use storage_config::StorageConfig;
