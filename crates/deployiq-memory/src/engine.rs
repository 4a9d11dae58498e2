//! DeploymentMemory: the service facade over an `IDeploymentStore`.

use std::sync::Arc;

use chrono::Utc;

use deployiq_core::config::MemoryConfig;
use deployiq_core::models::{
    AttemptUpdate, BuildConfigSnapshot, DeploymentAttempt, DeploymentInsights, DeploymentOutcome,
    ErrorType, FailureInsight, KnownSolution, LearningResult, RankedSolution, Solution,
    SuccessPrediction,
};
use deployiq_core::patterns::{fingerprint, normalize_error};
use deployiq_core::traits::{IDeploymentStore, StoreResult};

use crate::{insights, learning, prediction, ranking};

/// Attempt log, solution ranking, prediction, and the learning loop.
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct DeploymentMemory {
    store: Arc<dyn IDeploymentStore>,
    config: MemoryConfig,
}

impl DeploymentMemory {
    pub fn new(store: Arc<dyn IDeploymentStore>, config: MemoryConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn IDeploymentStore> {
        &self.store
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Persist a new attempt and return what is stored under its id.
    ///
    /// An empty id is replaced with a fresh UUID. When the id is already
    /// taken the existing record wins and is returned unchanged.
    pub fn log_attempt(&self, mut attempt: DeploymentAttempt) -> StoreResult<DeploymentAttempt> {
        if attempt.deployment_id.is_empty() {
            attempt.deployment_id = uuid::Uuid::new_v4().to_string();
        }
        if attempt.config_fingerprint.is_empty() {
            attempt.config_fingerprint = fingerprint(&attempt.build_config);
        }
        if self.store.insert_attempt(&attempt)? {
            tracing::debug!(deployment_id = %attempt.deployment_id, "attempt logged");
            return Ok(attempt);
        }
        tracing::warn!(deployment_id = %attempt.deployment_id, "attempt id already logged, keeping stored record");
        Ok(self.store.get_attempt(&attempt.deployment_id)?.unwrap_or(attempt))
    }

    /// Merge `update` into a stored attempt. Terminal attempts keep their
    /// fields and only take the learning stamp.
    pub fn update_status(
        &self,
        deployment_id: &str,
        update: &AttemptUpdate,
    ) -> StoreResult<Option<DeploymentAttempt>> {
        let Some(mut attempt) = self.store.get_attempt(deployment_id)? else {
            tracing::warn!(deployment_id, "status update for unknown deployment");
            return Ok(None);
        };
        if attempt.apply_update(update, Utc::now()) {
            self.store.upsert_attempt(&attempt)?;
        } else {
            tracing::debug!(deployment_id, status = %attempt.status, "update ignored for terminal attempt");
        }
        Ok(Some(attempt))
    }

    /// Past attempts with an error containing `pattern`, newest first.
    pub fn find_similar_errors(
        &self,
        pattern: &str,
        limit: usize,
    ) -> StoreResult<Vec<DeploymentAttempt>> {
        self.store.find_attempts_by_error(pattern, limit)
    }

    /// Number of historical attempts that hit `pattern`. Raw messages are
    /// normalized first.
    pub fn pattern_frequency(&self, pattern: &str) -> StoreResult<usize> {
        insights::pattern_frequency(self.store.as_ref(), &normalize_error(pattern))
    }

    pub fn rank_solutions(
        &self,
        issue_text: &str,
        error_type: Option<ErrorType>,
    ) -> StoreResult<Vec<RankedSolution>> {
        self.rank_solutions_above(issue_text, error_type, self.config.min_rank_effectiveness)
    }

    /// Like `rank_solutions` with an explicit effectiveness floor (exclusive).
    pub fn rank_solutions_above(
        &self,
        issue_text: &str,
        error_type: Option<ErrorType>,
        floor: f64,
    ) -> StoreResult<Vec<RankedSolution>> {
        let entries = self.store.search_known_solutions(issue_text, error_type)?;
        Ok(ranking::rank(entries, floor))
    }

    pub fn predict_success_rate(
        &self,
        snapshot: &BuildConfigSnapshot,
    ) -> StoreResult<SuccessPrediction> {
        prediction::predict(self.store.as_ref(), snapshot)
    }

    /// Fold a finished deployment into the knowledge base. Runs at most once
    /// per attempt.
    pub fn learn_from_outcome(
        &self,
        deployment_id: &str,
        outcome: DeploymentOutcome,
    ) -> StoreResult<LearningResult> {
        learning::learn(
            self.store.as_ref(),
            &self.config,
            deployment_id,
            outcome,
            Utc::now(),
        )
    }

    pub fn get_insights(&self, window_days: u32) -> StoreResult<DeploymentInsights> {
        insights::window_insights(self.store.as_ref(), &self.config, window_days, Utc::now())
    }

    pub fn failure_insight(&self, attempt: &DeploymentAttempt) -> StoreResult<FailureInsight> {
        insights::failure_insight(self.store.as_ref(), attempt, Utc::now())
    }

    /// Seed a curated fix for an error pattern.
    ///
    /// The pattern is normalized first, so raw messages may be passed. A
    /// solution with the same id replaces the stored one. This never marks
    /// the entry verified.
    pub fn register_solution(
        &self,
        pattern: &str,
        error_type: ErrorType,
        mut solution: Solution,
    ) -> StoreResult<KnownSolution> {
        let pattern = normalize_error(pattern);
        let now = Utc::now();
        let mut entry = self
            .store
            .get_known_solution(&pattern, error_type)?
            .unwrap_or_else(|| KnownSolution::curated(pattern.clone(), error_type, now));

        if solution.times_applied > 0 {
            solution.recompute();
        }
        match entry.solution_mut(&solution.id) {
            Some(existing) => *existing = solution,
            None => entry.solutions.push(solution),
        }
        entry.updated_at = now;
        self.store.upsert_known_solution(&entry)?;
        tracing::info!(pattern = %entry.error_pattern, %error_type, solutions = entry.solutions.len(), "solution registered");
        Ok(entry)
    }
}
