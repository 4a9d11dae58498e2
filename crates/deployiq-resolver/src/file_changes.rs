//! File edits performed by a solution, confined to the working directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use deployiq_core::models::{FileAction, FileChange};

/// Join `relative` onto `working_dir`, refusing absolute paths and any `..`
/// that climbs above the working directory. The check is lexical.
pub fn confine(working_dir: &Path, relative: &str) -> Result<PathBuf, String> {
    let mut depth = 0usize;
    let mut joined = working_dir.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                depth += 1;
                joined.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(format!("path escapes the working directory: {relative}"));
                }
                depth -= 1;
                joined.pop();
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("absolute paths are not allowed: {relative}"));
            }
        }
    }
    if depth == 0 {
        return Err(format!("path names no file: {relative:?}"));
    }
    Ok(joined)
}

/// Apply one change. `Create` requires the file to be absent, `Replace` and
/// `Delete` require it to exist, `Append` creates it when missing. Existence
/// is enforced by the open flags, not by a separate check.
pub async fn apply(change: &FileChange, working_dir: &Path) -> Result<(), String> {
    let path = confine(working_dir, &change.path)?;
    let content = change.content.as_deref().unwrap_or_default();
    let mut options = OpenOptions::new();
    match change.action {
        FileAction::Create => {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| e.to_string())?;
            }
            options.write(true).create_new(true);
        }
        FileAction::Replace => {
            options.write(true).truncate(true);
        }
        FileAction::Append => {
            options.create(true).append(true);
        }
        FileAction::Delete => {
            return tokio::fs::remove_file(&path)
                .await
                .map_err(|e| open_error(&change.path, e));
        }
    }
    let mut file = options
        .open(&path)
        .await
        .map_err(|e| open_error(&change.path, e))?;
    file.write_all(content.as_bytes()).await.map_err(|e| e.to_string())?;
    file.flush().await.map_err(|e| e.to_string())
}

fn open_error(path: &str, e: io::Error) -> String {
    match e.kind() {
        io::ErrorKind::AlreadyExists => format!("{path} already exists"),
        io::ErrorKind::NotFound => format!("{path} does not exist"),
        _ => format!("{path}: {e}"),
    }
}
