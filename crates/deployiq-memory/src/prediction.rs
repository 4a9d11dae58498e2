//! History-based success prediction for a build configuration.

use deployiq_core::constants::{DEFAULT_SUCCESS_RATE, MIN_PREDICTED_RATE, RISK_PENALTY};
use deployiq_core::models::{
    distinct_risks, recommendation_for, BuildConfigSnapshot, BuildPattern, RiskFactor, Severity,
    SuccessPrediction,
};
use deployiq_core::patterns::fingerprint;
use deployiq_core::prediction_span;
use deployiq_core::traits::{IDeploymentStore, StoreResult};

/// Checks on the configuration itself, on top of the analyzer's flags.
/// Only meaningful when a manifest was found.
pub fn config_risks(snapshot: &BuildConfigSnapshot) -> Vec<RiskFactor> {
    let mut risks = Vec::new();
    if !snapshot.has_manifest {
        return risks;
    }
    if !snapshot.has_lockfile && snapshot.dependency_count() > 0 {
        risks.push(RiskFactor::new(
            "missing_lockfile",
            Severity::Medium,
            "dependencies are declared but no lockfile was found",
        ));
    }
    if snapshot.runtime_version.is_none() {
        risks.push(RiskFactor::new(
            "unpinned_runtime",
            Severity::Low,
            "runtime version is not pinned",
        ));
    }
    risks
}

/// Success counts summed over every pattern in the bucket: `(successes, total)`.
pub fn bucket_counts(patterns: &[BuildPattern]) -> (u32, u32) {
    patterns.iter().fold((0, 0), |(ok, total), p| {
        (ok + p.success_count, total + p.total())
    })
}

/// `max(0.1, baseline − 0.1 × risks)`; exactly the default with no history.
pub fn predicted_rate(baseline: f64, sample_size: u32, risk_count: usize) -> f64 {
    if sample_size == 0 {
        return DEFAULT_SUCCESS_RATE;
    }
    (baseline - RISK_PENALTY * risk_count as f64).max(MIN_PREDICTED_RATE)
}

pub fn predict(
    store: &dyn IDeploymentStore,
    snapshot: &BuildConfigSnapshot,
) -> StoreResult<SuccessPrediction> {
    let fingerprint = fingerprint(snapshot);
    let _span = prediction_span!(fingerprint).entered();

    let patterns = store.find_build_patterns(
        snapshot.runtime_version.as_deref(),
        snapshot.framework_version.as_deref(),
    )?;
    let (successes, sample_size) = bucket_counts(&patterns);
    let baseline = if sample_size == 0 {
        DEFAULT_SUCCESS_RATE
    } else {
        f64::from(successes) / f64::from(sample_size)
    };

    let risk_factors = distinct_risks(
        snapshot
            .risk_factors
            .iter()
            .cloned()
            .chain(config_risks(snapshot)),
    );
    let success_rate = predicted_rate(baseline, sample_size, risk_factors.len());
    let recommendations = risk_factors
        .iter()
        .filter_map(|r| recommendation_for(&r.code))
        .map(str::to_string)
        .collect();

    tracing::debug!(
        baseline,
        sample_size,
        risks = risk_factors.len(),
        success_rate,
        "success rate predicted"
    );

    Ok(SuccessPrediction {
        fingerprint,
        baseline,
        sample_size,
        success_rate,
        risk_factors,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_history_is_exactly_default() {
        assert_eq!(predicted_rate(0.5, 0, 4), 0.5);
    }

    #[test]
    fn risks_subtract_down_to_floor() {
        assert!((predicted_rate(0.8, 10, 2) - 0.6).abs() < 1e-9);
        assert_eq!(predicted_rate(0.3, 10, 5), 0.1);
    }

    #[test]
    fn config_checks_need_a_manifest() {
        let bare = BuildConfigSnapshot::default();
        assert!(config_risks(&bare).is_empty());

        let mut snap = BuildConfigSnapshot {
            has_manifest: true,
            ..Default::default()
        };
        snap.dependencies.insert("react".into(), "18.2.0".into());
        let codes: Vec<_> = config_risks(&snap).into_iter().map(|r| r.code).collect();
        assert_eq!(codes, ["missing_lockfile", "unpinned_runtime"]);

        snap.has_lockfile = true;
        snap.runtime_version = Some("20".into());
        assert!(config_risks(&snap).is_empty());
    }
}
