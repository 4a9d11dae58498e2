use std::sync::Arc;

use deployiq_analyzer::BuildAnalyzer;
use deployiq_core::config::DeployIqConfig;
use deployiq_core::errors::ConfigError;
use deployiq_core::traits::{IAnalyticsSink, ICommandExecutor, IDeploymentStore, NoOpAnalytics};
use deployiq_memory::DeploymentMemory;
use deployiq_resolver::{AutoResolver, ShellExecutor};

use crate::active::ActiveDeployments;
use crate::monitor::BuildMonitor;

/// Wires a `BuildMonitor` from its injected services.
///
/// The store is required. Everything else has a default: compiled config,
/// `ShellExecutor` for remediation commands, and a no-op analytics sink.
pub struct BuildMonitorBuilder<E: ICommandExecutor = ShellExecutor> {
    config: DeployIqConfig,
    store: Option<Arc<dyn IDeploymentStore>>,
    analytics: Arc<dyn IAnalyticsSink>,
    executor: E,
}

impl BuildMonitorBuilder<ShellExecutor> {
    pub fn new() -> Self {
        Self {
            config: DeployIqConfig::default(),
            store: None,
            analytics: Arc::new(NoOpAnalytics),
            executor: ShellExecutor::new(),
        }
    }
}

impl Default for BuildMonitorBuilder<ShellExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ICommandExecutor> BuildMonitorBuilder<E> {
    pub fn config(mut self, config: DeployIqConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn IDeploymentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn analytics(mut self, analytics: Arc<dyn IAnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    /// Swap the command executor used when fixes are applied.
    pub fn executor<F: ICommandExecutor>(self, executor: F) -> BuildMonitorBuilder<F> {
        BuildMonitorBuilder {
            config: self.config,
            store: self.store,
            analytics: self.analytics,
            executor,
        }
    }

    pub fn build(self) -> Result<BuildMonitor<E>, ConfigError> {
        let store = self.store.ok_or_else(|| ConfigError::MissingStore {
            component: "BuildMonitor".to_string(),
        })?;
        self.config.validate()?;

        let memory = DeploymentMemory::new(store, self.config.memory.clone());
        let resolver = AutoResolver::new(
            memory.clone(),
            self.executor,
            self.config.resolver.clone(),
        );
        Ok(BuildMonitor {
            analyzer: BuildAnalyzer::new(self.config.analyzer.clone()),
            memory,
            resolver,
            analytics: self.analytics,
            config: self.config.monitor,
            active: ActiveDeployments::new(),
        })
    }
}
