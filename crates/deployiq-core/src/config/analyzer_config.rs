use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::SKIPPED_DIRS;
use crate::traits::ScanLimits;

/// Bounds and thresholds for the build analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Source files actually read by the code-quality scan.
    pub sample_size: usize,
    pub max_scan_depth: usize,
    /// Upper bound on files listed before sampling.
    pub max_listed_files: usize,
    pub asset_size_threshold_bytes: u64,
    /// Above this many dependencies an advisory risk is raised.
    pub dependency_count_threshold: usize,
    /// Extra directory names to skip on top of the built-in vendor list.
    pub extra_skip_dirs: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            sample_size: defaults::DEFAULT_SAMPLE_SIZE,
            max_scan_depth: defaults::DEFAULT_MAX_SCAN_DEPTH,
            max_listed_files: defaults::DEFAULT_MAX_LISTED_FILES,
            asset_size_threshold_bytes: defaults::DEFAULT_ASSET_SIZE_THRESHOLD_BYTES,
            dependency_count_threshold: defaults::DEFAULT_DEPENDENCY_COUNT_THRESHOLD,
            extra_skip_dirs: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn scan_limits(&self) -> ScanLimits {
        let mut skip_dirs: Vec<String> = SKIPPED_DIRS.iter().map(|d| (*d).to_string()).collect();
        skip_dirs.extend(self.extra_skip_dirs.iter().cloned());
        ScanLimits {
            max_depth: self.max_scan_depth,
            max_files: self.max_listed_files,
            skip_dirs,
        }
    }
}
