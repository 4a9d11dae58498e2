//! Top-level DeployIQ configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    AnalyzerConfig, MemoryConfig, MonitorConfig, ObservabilityConfig, ResolverConfig,
    StorageConfig,
};
use crate::errors::ConfigError;

pub const PROJECT_CONFIG_FILE: &str = "deployiq.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`DEPLOYIQ_*`)
/// 2. Project config (`deployiq.toml` in the project root)
/// 3. User config (`~/.deployiq/config.toml`)
/// 4. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeployIqConfig {
    pub storage: StorageConfig,
    pub analyzer: AnalyzerConfig,
    pub memory: MemoryConfig,
    pub resolver: ResolverConfig,
    pub monitor: MonitorConfig,
    pub observability: ObservabilityConfig,
}

impl DeployIqConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut merged = toml::Value::try_from(Self::default()).map_err(|e| {
            ConfigError::ParseError {
                path: "<defaults>".to_string(),
                message: e.to_string(),
            }
        })?;

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                merge_values(&mut merged, Self::read_toml_file(&user_path)?);
            }
        }

        let project_path = root.join(PROJECT_CONFIG_FILE);
        if project_path.exists() {
            merge_values(&mut merged, Self::read_toml_file(&project_path)?);
        }

        let mut config: Self = merged.try_into().map_err(|e: toml::de::Error| {
            ConfigError::ParseError {
                path: project_path.display().to_string(),
                message: e.to_string(),
            }
        })?;

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for tests and embedding).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DEPLOYIQ_*` overrides through the given lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DEPLOYIQ_DB_PATH") {
            self.storage.db_path = path;
        }
        if let Some(level) = lookup("DEPLOYIQ_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(raw) = lookup("DEPLOYIQ_AUTO_APPLY_CONFIDENCE") {
            self.monitor.auto_apply_confidence_threshold =
                parse_env("DEPLOYIQ_AUTO_APPLY_CONFIDENCE", &raw)?;
        }
        if let Some(raw) = lookup("DEPLOYIQ_SAMPLE_SIZE") {
            self.analyzer.sample_size = parse_env("DEPLOYIQ_SAMPLE_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("DEPLOYIQ_MIN_RANK_EFFECTIVENESS") {
            self.memory.min_rank_effectiveness =
                parse_env("DEPLOYIQ_MIN_RANK_EFFECTIVENESS", &raw)?;
        }
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields = [
            (
                "monitor.auto_apply_confidence_threshold",
                self.monitor.auto_apply_confidence_threshold,
            ),
            ("resolver.confidence_cap", self.resolver.confidence_cap),
            (
                "memory.top_solution_min_success_rate",
                self.memory.top_solution_min_success_rate,
            ),
            ("memory.confidence_step", self.memory.confidence_step),
        ];
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be between 0.0 and 1.0"));
            }
        }

        let weights = [
            ("resolver.effectiveness_weight", self.resolver.effectiveness_weight),
            ("resolver.success_rate_weight", self.resolver.success_rate_weight),
            ("resolver.recency_weight", self.resolver.recency_weight),
            ("resolver.automation_safe_bonus", self.resolver.automation_safe_bonus),
            ("resolver.many_cases_bonus", self.resolver.many_cases_bonus),
            ("resolver.some_cases_bonus", self.resolver.some_cases_bonus),
        ];
        for (field, value) in weights {
            if value < 0.0 || !value.is_finite() {
                return Err(invalid(field, "must be a non-negative number"));
            }
        }

        if !(0.0..=10.0).contains(&self.memory.min_rank_effectiveness) {
            return Err(invalid("memory.min_rank_effectiveness", "must be between 0 and 10"));
        }
        if self.resolver.recency_window_days <= 0.0 {
            return Err(invalid("resolver.recency_window_days", "must be greater than 0"));
        }
        if self.analyzer.sample_size == 0 {
            return Err(invalid("analyzer.sample_size", "must be greater than 0"));
        }
        if self.analyzer.max_scan_depth == 0 {
            return Err(invalid("analyzer.max_scan_depth", "must be greater than 0"));
        }
        if self.storage.read_pool_size == 0 {
            return Err(invalid("storage.read_pool_size", "must be greater than 0"));
        }
        if self.monitor.store_retry.max_attempts == 0 {
            return Err(invalid("monitor.store_retry.max_attempts", "must be at least 1"));
        }
        Ok(())
    }

    /// `~/.deployiq/config.toml`, when a home directory is known.
    fn user_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(|home| PathBuf::from(home).join(".deployiq").join("config.toml"))
    }

    fn read_toml_file(path: &Path) -> Result<toml::Value, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; any other value
/// in the overlay replaces the base value. Unknown keys pass through and are
/// ignored on deserialization.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::ValidationFailed {
        field: key.to_string(),
        message: format!("cannot parse {raw:?}"),
    })
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
