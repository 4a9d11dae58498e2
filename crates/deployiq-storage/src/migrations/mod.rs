//! Versioned schema migrations. The applied version lives in
//! `PRAGMA user_version`; each step runs in its own transaction.

pub mod v001_deployment_attempts;
pub mod v002_known_solutions;
pub mod v003_build_patterns;

use rusqlite::Connection;

use deployiq_core::errors::StorageError;
use deployiq_core::traits::StoreResult;

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> StoreResult<()>;

/// All migrations in order.
const MIGRATIONS: [(u32, &str, MigrationFn); 3] = [
    (1, "deployment_attempts", v001_deployment_attempts::migrate),
    (2, "known_solutions", v002_known_solutions::migrate),
    (3, "build_patterns", v003_build_patterns::migrate),
];

pub const LATEST_VERSION: u32 = 3;

/// The schema version currently recorded in the database.
pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Apply every migration newer than the recorded version. Returns the
/// number of migrations applied.
pub fn run_migrations(conn: &Connection) -> StoreResult<usize> {
    let current = current_version(conn)?;
    let mut applied = 0;

    for (version, name, migrate) in MIGRATIONS {
        if version <= current {
            continue;
        }
        let failed = |reason: String| StorageError::MigrationFailed { version, reason };

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| failed(e.to_string()))?;
        if let Err(e) = migrate(&tx) {
            let _ = tx.rollback();
            return Err(failed(e.to_string()));
        }
        tx.pragma_update(None, "user_version", version)
            .map_err(|e| failed(e.to_string()))?;
        tx.commit().map_err(|e| failed(e.to_string()))?;

        tracing::info!(version, name, "applied migration");
        applied += 1;
    }

    Ok(applied)
}
