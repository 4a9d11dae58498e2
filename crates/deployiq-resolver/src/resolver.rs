//! AutoResolver: pick the best known fix for an error and apply it on request.

use chrono::Utc;

use deployiq_core::config::ResolverConfig;
use deployiq_core::models::{ErrorRecord, ErrorType, Solution};
use deployiq_core::patterns::normalize_error;
use deployiq_core::resolution_span;
use deployiq_core::traits::{ICommandExecutor, StoreResult};
use deployiq_memory::DeploymentMemory;

use crate::application::{self, ApplicationReport, ApplyContext};
use crate::scoring;

/// The winning candidate for one error.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub error_pattern: String,
    pub error_type: ErrorType,
    pub solution: Solution,
    pub score: f64,
    pub confidence: f64,
    /// Historical attempts that hit the same pattern (bounded by the lookup limit).
    pub similar_cases: usize,
    pub candidates_considered: usize,
}

pub struct AutoResolver<E: ICommandExecutor> {
    memory: DeploymentMemory,
    executor: E,
    config: ResolverConfig,
}

impl<E: ICommandExecutor> AutoResolver<E> {
    pub fn new(memory: DeploymentMemory, executor: E, config: ResolverConfig) -> Self {
        Self {
            memory,
            executor,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Best-scoring known fix, or `None` when nothing matches yet.
    pub fn resolve_error(&self, error: &ErrorRecord) -> StoreResult<Option<Resolution>> {
        let pattern = normalize_error(&error.raw_message);
        let _span = resolution_span!(pattern).entered();

        let similar_cases = self
            .memory
            .find_similar_errors(&pattern, self.config.similar_lookup_limit)?
            .len();
        let candidates = self.memory.rank_solutions_above(
            &pattern,
            Some(error.error_type),
            self.config.min_candidate_effectiveness,
        )?;
        let candidates_considered = candidates.len();

        let now = Utc::now();
        let mut best: Option<(f64, _)> = None;
        for candidate in candidates {
            let score = scoring::score(&candidate.solution, &self.config, now);
            // Strictly greater keeps the earlier-ranked candidate on ties.
            if best.as_ref().map_or(true, |(top, _)| score > *top) {
                best = Some((score, candidate));
            }
        }
        let Some((score, winner)) = best else {
            tracing::debug!(similar_cases, "no known fix");
            return Ok(None);
        };

        let confidence = scoring::confidence(winner.solution.success_rate, similar_cases, &self.config);
        tracing::info!(
            solution_id = %winner.solution.id,
            score,
            confidence,
            similar_cases,
            candidates_considered,
            "error resolved to known fix"
        );
        Ok(Some(Resolution {
            error_pattern: winner.error_pattern,
            error_type: winner.error_type,
            solution: winner.solution,
            score,
            confidence,
            similar_cases,
            candidates_considered,
        }))
    }

    /// Run a solution's steps. Refuses without running anything unless the
    /// solution is flagged automation safe.
    pub async fn apply_solution(&self, solution: &Solution, ctx: &ApplyContext) -> ApplicationReport {
        application::apply(&self.executor, solution, ctx).await
    }
}
