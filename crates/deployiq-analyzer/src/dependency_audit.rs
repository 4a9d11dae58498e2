//! Dependency audit: deny-listed versions, missing peers, dependency count.

use serde::{Deserialize, Serialize};

use deployiq_core::constants::{KNOWN_BAD_VERSIONS, PEER_REQUIREMENTS};
use deployiq_core::models::{BuildConfigSnapshot, RiskFactor, Severity};

use crate::manifest::bare_version;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerableDependency {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingPeer {
    pub package: String,
    pub peer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyAudit {
    /// False when there was no parseable manifest to audit.
    pub audited: bool,
    pub total_dependencies: usize,
    pub vulnerabilities: Vec<VulnerableDependency>,
    pub missing_peers: Vec<MissingPeer>,
    pub over_threshold: bool,
}

impl DependencyAudit {
    pub fn run(snapshot: &BuildConfigSnapshot, audited: bool, count_threshold: usize) -> Self {
        if !audited {
            return Self::default();
        }

        let vulnerabilities = KNOWN_BAD_VERSIONS
            .iter()
            .filter_map(|(name, bad)| {
                let declared = snapshot
                    .dependencies
                    .get(*name)
                    .or_else(|| snapshot.dev_dependencies.get(*name))?;
                (bare_version(declared) == *bad).then(|| VulnerableDependency {
                    name: (*name).to_string(),
                    version: (*bad).to_string(),
                })
            })
            .collect();

        let missing_peers = PEER_REQUIREMENTS
            .iter()
            .filter(|(package, peer)| snapshot.has_dependency(package) && !snapshot.has_dependency(peer))
            .map(|(package, peer)| MissingPeer {
                package: (*package).to_string(),
                peer: (*peer).to_string(),
            })
            .collect();

        let total_dependencies = snapshot.dependency_count();
        Self {
            audited,
            total_dependencies,
            vulnerabilities,
            missing_peers,
            over_threshold: total_dependencies > count_threshold,
        }
    }

    /// Findings that count against the deployment. The count advisory is not one.
    pub fn finding_count(&self) -> usize {
        self.vulnerabilities.len() + self.missing_peers.len()
    }

    /// One aggregated risk factor per finding kind.
    pub fn risk_factors(&self) -> Vec<RiskFactor> {
        let mut risks = Vec::new();
        if !self.vulnerabilities.is_empty() {
            let names = self
                .vulnerabilities
                .iter()
                .map(|v| format!("{}@{}", v.name, v.version))
                .collect::<Vec<_>>()
                .join(", ");
            risks.push(RiskFactor::new(
                "known_bad_version",
                Severity::High,
                format!("Known-bad dependency versions: {names}"),
            ));
        }
        if !self.missing_peers.is_empty() {
            let pairs = self
                .missing_peers
                .iter()
                .map(|p| format!("{} requires {}", p.package, p.peer))
                .collect::<Vec<_>>()
                .join(", ");
            risks.push(RiskFactor::new(
                "missing_peer",
                Severity::Medium,
                format!("Missing peer dependencies: {pairs}"),
            ));
        }
        if self.over_threshold {
            risks.push(RiskFactor::new(
                "high_dependency_count",
                Severity::Low,
                format!("{} dependencies declared", self.total_dependencies),
            ));
        }
        risks
    }
}
