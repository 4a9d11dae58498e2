//! Public asset size check.

use deployiq_core::constants::PUBLIC_ASSET_DIR;
use deployiq_core::models::{RiskFactor, Severity};
use deployiq_core::traits::{IProjectSource, ScanLimits, SourceFile};

/// Every file under `public/` larger than `threshold_bytes`.
pub fn large_assets(
    source: &dyn IProjectSource,
    limits: &ScanLimits,
    threshold_bytes: u64,
) -> Vec<SourceFile> {
    match source.list_files(PUBLIC_ASSET_DIR, limits) {
        Ok(files) => files
            .into_iter()
            .filter(|f| f.size_bytes > threshold_bytes)
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "public assets unreadable");
            Vec::new()
        }
    }
}

pub fn risk_factor(assets: &[SourceFile], threshold_bytes: u64) -> Option<RiskFactor> {
    let largest = assets.iter().max_by_key(|a| a.size_bytes)?;
    Some(
        RiskFactor::new(
            "large_asset",
            Severity::Medium,
            format!(
                "{} public assets above {} KiB",
                assets.len(),
                threshold_bytes / 1024
            ),
        )
        .with_file(largest.path.clone()),
    )
}
