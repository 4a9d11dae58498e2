//! Deterministic build-configuration fingerprint.
//!
//! Only the key-dependency allow-list participates, so two configurations
//! that differ only in unrelated packages share a fingerprint.

use std::collections::BTreeMap;

use crate::constants::KEY_DEPENDENCIES;
use crate::models::BuildConfigSnapshot;

/// Filter runtime and dev dependencies down to the key allow-list.
/// Runtime entries win when a package appears in both maps.
pub fn key_dependencies(
    dependencies: &BTreeMap<String, String>,
    dev_dependencies: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    KEY_DEPENDENCIES
        .iter()
        .filter_map(|name| {
            dependencies
                .get(*name)
                .or_else(|| dev_dependencies.get(*name))
                .map(|version| ((*name).to_string(), version.clone()))
        })
        .collect()
}

/// Compute the fingerprint of a snapshot: a 16-hex-char blake3 prefix over
/// runtime version, framework version, key dependencies, env-var count, and
/// the custom deploy config flag.
pub fn fingerprint(snapshot: &BuildConfigSnapshot) -> String {
    let key_deps = if snapshot.key_dependencies.is_empty() {
        key_dependencies(&snapshot.dependencies, &snapshot.dev_dependencies)
    } else {
        snapshot.key_dependencies.clone()
    };
    let deps = key_deps
        .iter()
        .map(|(name, version)| format!("{name}@{version}"))
        .collect::<Vec<_>>()
        .join(",");
    let canonical = format!(
        "runtime={};framework={};deps={};env={};deploy_config={}",
        snapshot.runtime_version.as_deref().unwrap_or("unknown"),
        snapshot.framework_version.as_deref().unwrap_or("unknown"),
        deps,
        snapshot.env_var_count,
        snapshot.has_custom_deploy_config,
    );
    let hash = blake3::hash(canonical.as_bytes()).to_hex();
    hash.as_str()[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(deps: &[(&str, &str)]) -> BuildConfigSnapshot {
        BuildConfigSnapshot {
            runtime_version: Some("20.11.0".to_string()),
            framework_version: Some("14.1.0".to_string()),
            dependencies: deps
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            env_var_count: 4,
            ..Default::default()
        }
    }

    #[test]
    fn unrelated_packages_do_not_change_fingerprint() {
        let a = snapshot(&[("next", "14.1.0"), ("react", "18.2.0"), ("lodash", "4.17.21")]);
        let b = snapshot(&[("next", "14.1.0"), ("react", "18.2.0"), ("dayjs", "1.11.0")]);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn key_dependency_versions_change_fingerprint() {
        let a = snapshot(&[("next", "14.1.0")]);
        let b = snapshot(&[("next", "13.5.0")]);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn env_count_and_deploy_config_participate() {
        let a = snapshot(&[]);
        let mut b = a.clone();
        b.env_var_count = 5;
        let mut c = a.clone();
        c.has_custom_deploy_config = true;
        assert_ne!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&c));
        assert_eq!(fingerprint(&a).len(), 16);
    }

    #[test]
    fn dev_dependencies_feed_key_map() {
        let mut deps = BTreeMap::new();
        deps.insert("react".to_string(), "18.2.0".to_string());
        let mut dev = BTreeMap::new();
        dev.insert("typescript".to_string(), "5.3.3".to_string());
        dev.insert("eslint".to_string(), "8.0.0".to_string());
        let keys = key_dependencies(&deps, &dev);
        assert_eq!(keys.len(), 2);
        assert!(keys.contains_key("typescript"));
        assert!(!keys.contains_key("eslint"));
    }
}
