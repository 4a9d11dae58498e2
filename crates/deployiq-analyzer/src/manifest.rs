//! `package.json` reading.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Engines {
    pub node: Option<String>,
}

/// The parts of the manifest the analyzer reads. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Manifest {
    pub name: Option<String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    pub engines: Engines,
}

/// Outcome of looking for the manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestState {
    Missing,
    Invalid(String),
    Parsed(Manifest),
}

impl ManifestState {
    pub fn parse(content: &str) -> Self {
        match serde_json::from_str::<Manifest>(content) {
            Ok(manifest) => Self::Parsed(manifest),
            Err(e) => Self::Invalid(e.to_string()),
        }
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        match self {
            Self::Parsed(manifest) => Some(manifest),
            _ => None,
        }
    }
}

/// Strip range operators so `^1.2.3`, `~1.2.3`, `=v1.2.3` all read `1.2.3`.
pub fn bare_version(spec: &str) -> &str {
    spec.trim()
        .trim_start_matches(['^', '~', '=', '>', '<', ' '])
        .trim_start_matches('v')
}
