//! Build configuration snapshot, static risk flags, and per-fingerprint history.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// A named risk. Two factors with the same `code` count once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl RiskFactor {
    pub fn new(code: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Keep the first factor per code, in order.
pub fn distinct_risks(risks: impl IntoIterator<Item = RiskFactor>) -> Vec<RiskFactor> {
    let mut seen = std::collections::HashSet::new();
    risks
        .into_iter()
        .filter(|r| seen.insert(r.code.clone()))
        .collect()
}

/// Free-text advice for a risk code.
pub fn recommendation_for(code: &str) -> Option<&'static str> {
    Some(match code {
        "missing_manifest" => "Add a package.json so dependencies can be installed and audited",
        "invalid_manifest" => "Fix the JSON syntax in package.json",
        "known_bad_version" => "Upgrade or remove dependencies pinned to known-bad versions",
        "missing_peer" => "Install the missing peer dependencies",
        "high_dependency_count" => "Prune unused dependencies to shorten installs",
        "missing_type_config" => "Add tsconfig.json so the build type-checks consistently",
        "debug_statements" => "Remove console.log and debugger statements before deploying",
        "todo_markers" => "Review TODO/FIXME markers in code headed to production",
        "large_asset" => "Compress or lazy-load large files under public/",
        "missing_lockfile" => "Commit a lockfile so installs are reproducible",
        "unpinned_runtime" => "Pin the Node.js version via engines.node or .nvmrc",
        _ => return None,
    })
}

/// What the analyzer saw in the project at deployment start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfigSnapshot {
    pub runtime_version: Option<String>,
    pub framework: Option<String>,
    pub framework_version: Option<String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    /// `dependencies ∪ dev_dependencies` filtered to the key allow-list.
    pub key_dependencies: BTreeMap<String, String>,
    pub env_var_count: u32,
    pub has_custom_deploy_config: bool,
    pub has_manifest: bool,
    pub has_lockfile: bool,
    pub typed_source: bool,
    pub commit_hash: Option<String>,
    pub branch: Option<String>,
    pub risk_factors: Vec<RiskFactor>,
}

impl BuildConfigSnapshot {
    pub fn dependency_count(&self) -> usize {
        self.dependencies.len() + self.dev_dependencies.len()
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }
}

/// Running build-time statistics for one fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildTimeStats {
    pub samples: u32,
    pub total_seconds: f64,
    pub min_seconds: Option<f64>,
    pub max_seconds: Option<f64>,
    pub avg_seconds: f64,
}

impl BuildTimeStats {
    pub fn record(&mut self, seconds: f64) {
        self.samples += 1;
        self.total_seconds += seconds;
        self.min_seconds = Some(self.min_seconds.map_or(seconds, |m| m.min(seconds)));
        self.max_seconds = Some(self.max_seconds.map_or(seconds, |m| m.max(seconds)));
        self.avg_seconds = self.total_seconds / f64::from(self.samples);
    }
}

/// Outcome history of every deployment sharing a fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPattern {
    pub fingerprint: String,
    pub runtime_version: Option<String>,
    pub framework_version: Option<String>,
    pub key_dependencies: BTreeMap<String, String>,
    pub env_var_count: u32,
    pub has_custom_deploy_config: bool,
    pub success_count: u32,
    pub failure_count: u32,
    pub success_rate: f64,
    pub build_time: BuildTimeStats,
    pub last_updated: DateTime<Utc>,
}

impl BuildPattern {
    pub fn from_snapshot(
        fingerprint: impl Into<String>,
        snapshot: &BuildConfigSnapshot,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            runtime_version: snapshot.runtime_version.clone(),
            framework_version: snapshot.framework_version.clone(),
            key_dependencies: snapshot.key_dependencies.clone(),
            env_var_count: snapshot.env_var_count,
            has_custom_deploy_config: snapshot.has_custom_deploy_config,
            success_count: 0,
            failure_count: 0,
            success_rate: 0.0,
            build_time: BuildTimeStats::default(),
            last_updated: now,
        }
    }

    pub fn record_outcome(&mut self, success: bool, build_time_seconds: Option<f64>, now: DateTime<Utc>) {
        if success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        let total = self.success_count + self.failure_count;
        self.success_rate = f64::from(self.success_count) / f64::from(total);
        if let Some(seconds) = build_time_seconds {
            self.build_time.record(seconds);
        }
        self.last_updated = now;
    }

    pub fn total(&self) -> u32 {
        self.success_count + self.failure_count
    }
}
