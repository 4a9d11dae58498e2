//! # deployiq-storage
//!
//! SQLite implementation of `IDeploymentStore`: one serialized write
//! connection, a round-robin read pool, versioned migrations, and one query
//! module per collection.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use deployiq_core::errors::StorageError;

/// Helper to convert a rusqlite (or any stringly) error into a `StorageError`.
pub fn to_storage_err(msg: String) -> StorageError {
    StorageError::SqliteError { message: msg }
}
