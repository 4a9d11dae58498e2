//! v003: build_patterns keyed by configuration fingerprint.

use rusqlite::Connection;

use deployiq_core::traits::StoreResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS build_patterns (
            fingerprint        TEXT PRIMARY KEY,
            runtime_version    TEXT,
            framework_version  TEXT,
            success_count      INTEGER NOT NULL DEFAULT 0,
            failure_count      INTEGER NOT NULL DEFAULT 0,
            success_rate       REAL NOT NULL DEFAULT 0.0,
            last_updated       TEXT NOT NULL,
            document           TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_build_patterns_success_rate ON build_patterns(success_rate);
        CREATE INDEX IF NOT EXISTS idx_build_patterns_versions
            ON build_patterns(runtime_version, framework_version);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
