//! Flatten known solutions into a single effectiveness-ordered candidate list.

use std::cmp::Ordering;

use deployiq_core::models::{KnownSolution, RankedSolution};

/// Every solution strictly above `floor`, best first.
///
/// Ordered by effectiveness, then success rate, both descending. The sort is
/// stable, so equal candidates keep store order (highest entry confidence first).
pub fn rank(entries: Vec<KnownSolution>, floor: f64) -> Vec<RankedSolution> {
    let mut ranked: Vec<RankedSolution> = entries
        .into_iter()
        .flat_map(|entry| {
            let KnownSolution {
                error_pattern,
                error_type,
                verified,
                solutions,
                ..
            } = entry;
            solutions
                .into_iter()
                .filter(move |s| s.effectiveness > floor)
                .map(move |solution| RankedSolution {
                    error_pattern: error_pattern.clone(),
                    error_type,
                    verified,
                    solution,
                })
        })
        .collect();
    ranked.sort_by(compare);
    ranked
}

fn compare(a: &RankedSolution, b: &RankedSolution) -> Ordering {
    b.solution
        .effectiveness
        .total_cmp(&a.solution.effectiveness)
        .then_with(|| b.solution.success_rate.total_cmp(&a.solution.success_rate))
}
