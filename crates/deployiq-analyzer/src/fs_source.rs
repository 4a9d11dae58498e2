//! Filesystem-backed `IProjectSource`: `ignore` for bounded walking, `git2`
//! for HEAD and branch.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use deployiq_core::errors::AnalyzerError;
use deployiq_core::traits::{GitInfo, IProjectSource, ScanLimits, SourceFile};

/// A project checkout on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsProjectSource {
    root: PathBuf,
}

impl FsProjectSource {
    /// Open a project root. Fails only when the root itself cannot be listed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, AnalyzerError> {
        let root = root.into();
        fs::read_dir(&root).map_err(|e| AnalyzerError::RootInaccessible {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { root })
    }

    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl IProjectSource for FsProjectSource {
    fn root(&self) -> &Path {
        &self.root
    }

    fn read_file(&self, relative: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(relative))
    }

    fn exists(&self, relative: &str) -> bool {
        self.root.join(relative).exists()
    }

    fn list_files(&self, relative_dir: &str, limits: &ScanLimits) -> io::Result<Vec<SourceFile>> {
        let dir = if relative_dir.is_empty() {
            // Listing the root is the one listing that must not silently degrade.
            fs::read_dir(&self.root)?;
            self.root.clone()
        } else {
            let dir = self.root.join(relative_dir);
            if !dir.is_dir() {
                return Ok(Vec::new());
            }
            dir
        };

        let skip: HashSet<String> = limits.skip_dirs.iter().cloned().collect();
        let walker = WalkBuilder::new(&dir)
            .hidden(true)
            .follow_links(false)
            .max_depth(Some(limits.max_depth))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir
                    && entry.depth() > 0
                    && skip.contains(entry.file_name().to_string_lossy().as_ref()))
            })
            .build();

        let mut files = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            files.push(SourceFile {
                path: self.relative_path(entry.path()),
                size_bytes,
            });
            if files.len() >= limits.max_files {
                tracing::debug!(max_files = limits.max_files, "listing truncated");
                break;
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn git_info(&self) -> Option<GitInfo> {
        let repo = git2::Repository::discover(&self.root).ok()?;
        let head = repo.head().ok();
        let commit_hash = head
            .as_ref()
            .and_then(|h| h.peel_to_commit().ok())
            .map(|commit| commit.id().to_string());
        let branch = head
            .as_ref()
            .filter(|h| h.is_branch())
            .and_then(|h| h.shorthand())
            .map(str::to_string);

        Some(GitInfo {
            commit_hash,
            branch,
        })
    }
}
