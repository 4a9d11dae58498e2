//! StorageEngine: owns the ConnectionPool, runs migrations on open, and
//! implements `IDeploymentStore`.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use deployiq_core::config::StorageConfig;
use deployiq_core::models::{
    BuildPattern, DeploymentAttempt, ErrorPatternCount, ErrorType, KnownSolution, RankedSolution,
    StatusSummary,
};
use deployiq_core::traits::{IDeploymentStore, StoreResult};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{aggregation, attempt_ops, pattern_ops, solution_ops};

/// Default number of read connections for file-backed databases.
const DEFAULT_READ_POOL_SIZE: usize = 4;

/// SQLite-backed deployment store.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with_pool_size(path, DEFAULT_READ_POOL_SIZE)
    }

    pub fn open_with_pool_size(path: &Path, read_pool_size: usize) -> StoreResult<Self> {
        // The writer must create the file before read-only connections can open it.
        let pool = ConnectionPool::open(path, read_pool_size)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open the database named by the storage section of the config.
    pub fn from_config(config: &StorageConfig) -> StoreResult<Self> {
        Self::open_with_pool_size(Path::new(&config.db_path), config.read_pool_size)
    }

    /// Open an in-memory storage engine. All reads go through the writer.
    pub fn open_in_memory() -> StoreResult<Self> {
        let engine = Self {
            pool: ConnectionPool::open_in_memory()?,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Run migrations.
    fn initialize(&self) -> StoreResult<()> {
        let applied = self.pool.writer.with_conn(migrations::run_migrations)?;
        tracing::debug!(
            applied,
            path = ?self.pool.db_path,
            "deployment store ready"
        );
        Ok(())
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Execute a read-only query on the best available connection.
    fn with_reader<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f),
        }
    }
}

impl IDeploymentStore for StorageEngine {
    fn insert_attempt(&self, attempt: &DeploymentAttempt) -> StoreResult<bool> {
        self.pool
            .writer
            .with_conn(|conn| attempt_ops::insert_attempt(conn, attempt))
    }

    fn upsert_attempt(&self, attempt: &DeploymentAttempt) -> StoreResult<()> {
        self.pool
            .writer
            .with_conn(|conn| attempt_ops::upsert_attempt(conn, attempt))
    }

    fn get_attempt(&self, deployment_id: &str) -> StoreResult<Option<DeploymentAttempt>> {
        self.with_reader(|conn| attempt_ops::get_attempt(conn, deployment_id))
    }

    fn find_attempts_by_error(
        &self,
        pattern: &str,
        limit: usize,
    ) -> StoreResult<Vec<DeploymentAttempt>> {
        self.with_reader(|conn| attempt_ops::find_attempts_by_error(conn, pattern, limit))
    }

    fn count_attempts_by_error(&self, pattern: &str) -> StoreResult<usize> {
        self.with_reader(|conn| attempt_ops::count_attempts_by_error(conn, pattern))
    }

    fn query_attempts_since(
        &self,
        from: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<DeploymentAttempt>> {
        self.with_reader(|conn| attempt_ops::query_attempts_since(conn, from, limit))
    }

    fn status_summary(&self, since: DateTime<Utc>) -> StoreResult<Vec<StatusSummary>> {
        self.with_reader(|conn| aggregation::status_summary(conn, since))
    }

    fn top_error_patterns(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> StoreResult<Vec<ErrorPatternCount>> {
        self.with_reader(|conn| aggregation::top_error_patterns(conn, since, limit))
    }

    fn get_known_solution(
        &self,
        error_pattern: &str,
        error_type: ErrorType,
    ) -> StoreResult<Option<KnownSolution>> {
        self.with_reader(|conn| solution_ops::get_known_solution(conn, error_pattern, error_type))
    }

    fn find_known_solution_by_solution_id(
        &self,
        error_pattern: &str,
        solution_id: &str,
    ) -> StoreResult<Option<KnownSolution>> {
        self.with_reader(|conn| solution_ops::find_by_solution_id(conn, error_pattern, solution_id))
    }

    fn search_known_solutions(
        &self,
        issue_text: &str,
        error_type: Option<ErrorType>,
    ) -> StoreResult<Vec<KnownSolution>> {
        self.with_reader(|conn| solution_ops::search_known_solutions(conn, issue_text, error_type))
    }

    fn upsert_known_solution(&self, known: &KnownSolution) -> StoreResult<()> {
        self.pool
            .writer
            .with_conn(|conn| solution_ops::upsert_known_solution(conn, known))
    }

    fn top_solutions(
        &self,
        min_applied: u32,
        min_success_rate: f64,
        limit: usize,
    ) -> StoreResult<Vec<RankedSolution>> {
        self.with_reader(|conn| {
            solution_ops::top_solutions(conn, min_applied, min_success_rate, limit)
        })
    }

    fn get_build_pattern(&self, fingerprint: &str) -> StoreResult<Option<BuildPattern>> {
        self.with_reader(|conn| pattern_ops::get_build_pattern(conn, fingerprint))
    }

    fn find_build_patterns(
        &self,
        runtime_version: Option<&str>,
        framework_version: Option<&str>,
    ) -> StoreResult<Vec<BuildPattern>> {
        self.with_reader(|conn| {
            pattern_ops::find_build_patterns(conn, runtime_version, framework_version)
        })
    }

    fn upsert_build_pattern(&self, pattern: &BuildPattern) -> StoreResult<()> {
        self.pool
            .writer
            .with_conn(|conn| pattern_ops::upsert_build_pattern(conn, pattern))
    }
}
