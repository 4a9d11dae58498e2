//! Compiled defaults. Scoring and threshold values reproduce the heuristics
//! the pipeline was tuned with; they are tunable, not physical constants.

// Storage
pub const DEFAULT_DB_PATH: &str = "deployiq.db";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// Analyzer
pub const DEFAULT_SAMPLE_SIZE: usize = 50;
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 12;
pub const DEFAULT_MAX_LISTED_FILES: usize = 5_000;
pub const DEFAULT_ASSET_SIZE_THRESHOLD_BYTES: u64 = 1_048_576;
pub const DEFAULT_DEPENDENCY_COUNT_THRESHOLD: usize = 100;

// Memory
pub const DEFAULT_MIN_RANK_EFFECTIVENESS: f64 = 6.0;
pub const DEFAULT_INSIGHT_TOP_N: usize = 10;
pub const DEFAULT_TOP_SOLUTION_MIN_APPLIED: u32 = 3;
pub const DEFAULT_TOP_SOLUTION_MIN_SUCCESS_RATE: f64 = 0.7;
pub const DEFAULT_CONFIDENCE_STEP: f64 = 0.05;

// Resolver
pub const DEFAULT_EFFECTIVENESS_WEIGHT: f64 = 0.4;
pub const DEFAULT_SUCCESS_RATE_WEIGHT: f64 = 3.0;
pub const DEFAULT_RECENCY_WEIGHT: f64 = 2.0;
pub const DEFAULT_AUTOMATION_SAFE_BONUS: f64 = 1.0;
pub const DEFAULT_RECENCY_WINDOW_DAYS: f64 = 30.0;
pub const DEFAULT_MANY_CASES_THRESHOLD: usize = 5;
pub const DEFAULT_MANY_CASES_BONUS: f64 = 0.2;
pub const DEFAULT_SOME_CASES_THRESHOLD: usize = 2;
pub const DEFAULT_SOME_CASES_BONUS: f64 = 0.1;
pub const DEFAULT_CONFIDENCE_CAP: f64 = 0.95;
pub const DEFAULT_SIMILAR_LOOKUP_LIMIT: usize = 20;
pub const DEFAULT_MIN_CANDIDATE_EFFECTIVENESS: f64 = 0.0;

// Monitor
pub const DEFAULT_AUTO_APPLY_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_STORE_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_STORE_RETRY_BACKOFF_MS: u64 = 50;

// Observability
pub const DEFAULT_LOG_LEVEL: &str = "info";
