//! v002: known_solutions keyed by (pattern, error type), and their solutions.

use rusqlite::Connection;

use deployiq_core::traits::StoreResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS known_solutions (
            error_pattern  TEXT NOT NULL,
            error_type     TEXT NOT NULL,
            confidence     REAL NOT NULL DEFAULT 0.0,
            verified       INTEGER NOT NULL DEFAULT 0,
            occurrences    INTEGER NOT NULL DEFAULT 0,
            tags           TEXT NOT NULL DEFAULT '[]',
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL,
            document       TEXT NOT NULL,
            PRIMARY KEY (error_pattern, error_type)
        );

        CREATE INDEX IF NOT EXISTS idx_known_solutions_type ON known_solutions(error_type);
        CREATE INDEX IF NOT EXISTS idx_known_solutions_verified ON known_solutions(verified);
        CREATE INDEX IF NOT EXISTS idx_known_solutions_tags ON known_solutions(tags);

        CREATE TABLE IF NOT EXISTS solutions (
            id                TEXT NOT NULL,
            error_pattern     TEXT NOT NULL,
            error_type        TEXT NOT NULL,
            effectiveness     REAL NOT NULL DEFAULT 0.0,
            success_rate      REAL NOT NULL DEFAULT 0.0,
            times_applied     INTEGER NOT NULL DEFAULT 0,
            times_successful  INTEGER NOT NULL DEFAULT 0,
            automation_safe   INTEGER NOT NULL DEFAULT 0,
            last_used         TEXT,
            document          TEXT NOT NULL,
            PRIMARY KEY (error_pattern, error_type, id),
            FOREIGN KEY (error_pattern, error_type)
                REFERENCES known_solutions(error_pattern, error_type) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_solutions_id ON solutions(id);
        CREATE INDEX IF NOT EXISTS idx_solutions_effectiveness ON solutions(effectiveness);
        CREATE INDEX IF NOT EXISTS idx_solutions_success_rate ON solutions(success_rate);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
