//! Seams to the outside world: persistent store, project filesystem,
//! command execution, and analytics.

pub mod analytics;
pub mod executor;
pub mod project_source;
pub mod storage;

pub use analytics::{IAnalyticsSink, NoOpAnalytics, TracingAnalytics};
pub use executor::{CommandOutput, ICommandExecutor};
pub use project_source::{GitInfo, IProjectSource, ScanLimits, SourceFile};
pub use storage::{IDeploymentStore, StoreResult};
