use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A file found under the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    pub size_bytes: u64,
}

/// Optional VCS signals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    pub commit_hash: Option<String>,
    pub branch: Option<String>,
}

/// Bounds for recursive listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLimits {
    pub max_depth: usize,
    pub max_files: usize,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
}

/// Best-effort read access to a project checkout.
pub trait IProjectSource: Send + Sync {
    fn root(&self) -> &Path;

    /// Read a file relative to the root.
    fn read_file(&self, relative: &str) -> io::Result<String>;

    fn exists(&self, relative: &str) -> bool;

    /// Recursively list regular files under `relative_dir` (empty = root).
    /// Hidden and skipped directories are pruned and symlinks are never
    /// followed. A missing directory yields an empty list.
    fn list_files(&self, relative_dir: &str, limits: &ScanLimits) -> io::Result<Vec<SourceFile>>;

    /// HEAD commit, branch, and working-tree changes. `None` when there is no
    /// repository or it cannot be read.
    fn git_info(&self) -> Option<GitInfo>;
}
