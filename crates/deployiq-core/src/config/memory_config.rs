use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// `rank_solutions` keeps only solutions strictly above this.
    pub min_rank_effectiveness: f64,
    pub insight_top_n: usize,
    pub top_solution_min_applied: u32,
    pub top_solution_min_success_rate: f64,
    /// Known-solution confidence moves by this much per learned outcome.
    pub confidence_step: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            min_rank_effectiveness: defaults::DEFAULT_MIN_RANK_EFFECTIVENESS,
            insight_top_n: defaults::DEFAULT_INSIGHT_TOP_N,
            top_solution_min_applied: defaults::DEFAULT_TOP_SOLUTION_MIN_APPLIED,
            top_solution_min_success_rate: defaults::DEFAULT_TOP_SOLUTION_MIN_SUCCESS_RATE,
            confidence_step: defaults::DEFAULT_CONFIDENCE_STEP,
        }
    }
}
