//! BuildAnalyzer: runs the scans and combines them into a `BuildAnalysis`.

use deployiq_core::analysis_span;
use deployiq_core::config::AnalyzerConfig;
use deployiq_core::errors::AnalyzerError;
use deployiq_core::models::{distinct_risks, recommendation_for, RiskFactor, Severity};
use deployiq_core::patterns::fingerprint;
use deployiq_core::traits::IProjectSource;

use crate::analysis::BuildAnalysis;
use crate::dependency_audit::DependencyAudit;
use crate::manifest::ManifestState;
use crate::{asset_scan, code_scan, snapshot};

pub struct BuildAnalyzer {
    config: AnalyzerConfig,
}

impl BuildAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a project. Only an unlistable root is an error.
    pub fn analyze(&self, source: &dyn IProjectSource) -> Result<BuildAnalysis, AnalyzerError> {
        let root = source.root().display().to_string();
        let _span = analysis_span!(root).entered();

        let limits = self.config.scan_limits();
        let files = source
            .list_files("", &limits)
            .map_err(|e| AnalyzerError::RootInaccessible {
                path: root.clone(),
                reason: e.to_string(),
            })?;

        let manifest = snapshot::read_manifest(source);
        let mut snapshot = snapshot::build_snapshot(source, &manifest, &files);

        let mut risks = Vec::new();
        match &manifest {
            ManifestState::Missing => risks.push(RiskFactor::new(
                "missing_manifest",
                Severity::High,
                "No package.json at the project root",
            )),
            ManifestState::Invalid(reason) => risks.push(
                RiskFactor::new(
                    "invalid_manifest",
                    Severity::High,
                    format!("package.json could not be parsed: {reason}"),
                )
                .with_file("package.json"),
            ),
            ManifestState::Parsed(_) => {}
        }

        let dependency_audit = DependencyAudit::run(
            &snapshot,
            manifest.manifest().is_some(),
            self.config.dependency_count_threshold,
        );
        risks.extend(dependency_audit.risk_factors());

        let code_quality =
            code_scan::scan(source, &files, self.config.sample_size, snapshot.typed_source);
        risks.extend(code_quality.risk_factors());

        let large_assets =
            asset_scan::large_assets(source, &limits, self.config.asset_size_threshold_bytes);
        risks.extend(asset_scan::risk_factor(
            &large_assets,
            self.config.asset_size_threshold_bytes,
        ));

        let risk_factors = distinct_risks(risks);
        let recommendations = risk_factors
            .iter()
            .filter_map(|r| recommendation_for(&r.code))
            .map(str::to_string)
            .collect();
        snapshot.risk_factors = risk_factors.clone();

        let mut analysis = BuildAnalysis {
            fingerprint: fingerprint(&snapshot),
            snapshot,
            dependency_audit,
            code_quality,
            large_assets,
            success_seed: BuildAnalysis::seed_for(risk_factors.len()),
            risk_factors,
            recommendations,
            confidence: 0.0,
        };
        analysis.confidence = analysis.confidence_for(analysis.success_seed);

        tracing::info!(
            fingerprint = %analysis.fingerprint,
            files = files.len(),
            risks = analysis.risk_factors.len(),
            seed = analysis.success_seed,
            confidence = analysis.confidence,
            "build analysis complete"
        );
        Ok(analysis)
    }
}

impl Default for BuildAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}
