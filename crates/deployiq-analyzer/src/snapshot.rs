//! Build configuration snapshot: manifest, runtime, framework, lockfile, env
//! keys, deploy config, typed source, and git.

use std::collections::BTreeSet;

use deployiq_core::constants::{
    DEPLOY_CONFIG_FILE, ENV_FILES, LOCKFILES, MANIFEST_FILE, RUNTIME_VERSION_FILE, TYPED_EXTENSIONS,
};
use deployiq_core::models::BuildConfigSnapshot;
use deployiq_core::patterns::key_dependencies;
use deployiq_core::traits::{IProjectSource, SourceFile};

use crate::manifest::{bare_version, ManifestState};

/// Framework packages in detection priority: meta-frameworks before the
/// libraries they are built on.
const FRAMEWORKS: &[(&str, &str)] = &[
    ("next", "nextjs"),
    ("nuxt", "nuxt"),
    ("@sveltejs/kit", "sveltekit"),
    ("@angular/core", "angular"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("react", "react"),
    ("express", "express"),
];

/// Read the manifest. An unreadable file counts as missing.
pub fn read_manifest(source: &dyn IProjectSource) -> ManifestState {
    if !source.exists(MANIFEST_FILE) {
        return ManifestState::Missing;
    }
    match source.read_file(MANIFEST_FILE) {
        Ok(content) => ManifestState::parse(&content),
        Err(e) => {
            tracing::debug!(error = %e, "manifest unreadable");
            ManifestState::Missing
        }
    }
}

/// Assemble the snapshot. `source_files` is the bounded root listing.
pub fn build_snapshot(
    source: &dyn IProjectSource,
    manifest: &ManifestState,
    source_files: &[SourceFile],
) -> BuildConfigSnapshot {
    let mut snapshot = BuildConfigSnapshot {
        has_manifest: !matches!(manifest, ManifestState::Missing),
        ..Default::default()
    };

    if let Some(manifest) = manifest.manifest() {
        snapshot.dependencies = manifest.dependencies.clone();
        snapshot.dev_dependencies = manifest.dev_dependencies.clone();
        snapshot.runtime_version = manifest.engines.node.as_deref().map(|v| bare_version(v).to_string());
    }
    if snapshot.runtime_version.is_none() {
        snapshot.runtime_version = source
            .read_file(RUNTIME_VERSION_FILE)
            .ok()
            .map(|v| bare_version(&v).to_string())
            .filter(|v| !v.is_empty());
    }

    if let Some((package, framework)) = FRAMEWORKS
        .iter()
        .find(|(package, _)| snapshot.has_dependency(package))
    {
        snapshot.framework = Some((*framework).to_string());
        snapshot.framework_version = snapshot
            .dependencies
            .get(*package)
            .or_else(|| snapshot.dev_dependencies.get(*package))
            .map(|v| bare_version(v).to_string());
    }

    snapshot.key_dependencies = key_dependencies(&snapshot.dependencies, &snapshot.dev_dependencies);
    snapshot.has_lockfile = LOCKFILES.iter().any(|f| source.exists(f));
    snapshot.env_var_count = count_env_keys(source);
    snapshot.has_custom_deploy_config = source.exists(DEPLOY_CONFIG_FILE);
    snapshot.typed_source = snapshot.has_dependency("typescript")
        || source_files.iter().any(|f| has_extension(&f.path, TYPED_EXTENSIONS));

    if let Some(git) = source.git_info() {
        snapshot.commit_hash = git.commit_hash;
        snapshot.branch = git.branch;
    }
    snapshot
}

/// Distinct `KEY=` entries across all env files. Unreadable files are skipped.
fn count_env_keys(source: &dyn IProjectSource) -> u32 {
    let mut keys = BTreeSet::new();
    for file in ENV_FILES {
        let Ok(content) = source.read_file(file) else {
            continue;
        };
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            if let Some((key, _)) = line.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    keys.insert(key.to_string());
                }
            }
        }
    }
    keys.len() as u32
}

pub(crate) fn has_extension(path: &str, extensions: &[&str]) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}
