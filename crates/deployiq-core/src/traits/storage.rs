use chrono::{DateTime, Utc};

use crate::errors::StorageError;
use crate::models::{
    BuildPattern, DeploymentAttempt, ErrorPatternCount, ErrorType, KnownSolution, RankedSolution,
    StatusSummary,
};

pub type StoreResult<T> = Result<T, StorageError>;

/// Persistent store over three collections: deployment attempts, known
/// solutions, and build patterns. Every write is an idempotent upsert keyed by
/// deployment id, (pattern, error type), or fingerprint, so callers may retry.
pub trait IDeploymentStore: Send + Sync {
    // --- deployment_attempts ---
    /// Insert unless the id already exists. Returns false when it did.
    fn insert_attempt(&self, attempt: &DeploymentAttempt) -> StoreResult<bool>;
    fn upsert_attempt(&self, attempt: &DeploymentAttempt) -> StoreResult<()>;
    fn get_attempt(&self, deployment_id: &str) -> StoreResult<Option<DeploymentAttempt>>;
    /// Attempts with an error whose pattern or raw text contains `pattern`
    /// (case-insensitive), newest first.
    fn find_attempts_by_error(&self, pattern: &str, limit: usize)
        -> StoreResult<Vec<DeploymentAttempt>>;
    fn count_attempts_by_error(&self, pattern: &str) -> StoreResult<usize>;
    fn query_attempts_since(
        &self,
        from: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<DeploymentAttempt>>;

    // --- aggregation ---
    fn status_summary(&self, since: DateTime<Utc>) -> StoreResult<Vec<StatusSummary>>;
    fn top_error_patterns(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<ErrorPatternCount>>;

    // --- known_solutions ---
    fn get_known_solution(
        &self,
        error_pattern: &str,
        error_type: ErrorType,
    ) -> StoreResult<Option<KnownSolution>>;
    /// The entry under `error_pattern` that holds `solution_id`. The same
    /// solution id may be registered under several patterns.
    fn find_known_solution_by_solution_id(
        &self,
        error_pattern: &str,
        solution_id: &str,
    ) -> StoreResult<Option<KnownSolution>>;
    /// Entries whose pattern contains `issue_text` (case-insensitive).
    fn search_known_solutions(
        &self,
        issue_text: &str,
        error_type: Option<ErrorType>,
    ) -> StoreResult<Vec<KnownSolution>>;
    fn upsert_known_solution(&self, known: &KnownSolution) -> StoreResult<()>;
    /// Solutions with at least `min_applied` uses and `min_success_rate`,
    /// ranked by (effectiveness, success rate, usage).
    fn top_solutions(
        &self,
        min_applied: u32,
        min_success_rate: f64,
        limit: usize,
    ) -> StoreResult<Vec<RankedSolution>>;

    // --- build_patterns ---
    fn get_build_pattern(&self, fingerprint: &str) -> StoreResult<Option<BuildPattern>>;
    /// Patterns sharing the key fingerprint fields (runtime and framework version).
    fn find_build_patterns(
        &self,
        runtime_version: Option<&str>,
        framework_version: Option<&str>,
    ) -> StoreResult<Vec<BuildPattern>>;
    fn upsert_build_pattern(&self, pattern: &BuildPattern) -> StoreResult<()>;
}
