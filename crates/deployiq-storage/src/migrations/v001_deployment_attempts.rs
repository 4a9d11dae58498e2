//! v001: deployment_attempts plus the attempt_errors pattern index table.

use rusqlite::Connection;

use deployiq_core::traits::StoreResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS deployment_attempts (
            deployment_id           TEXT PRIMARY KEY,
            created_at              TEXT NOT NULL,
            updated_at              TEXT NOT NULL,
            environment             TEXT NOT NULL,
            status                  TEXT NOT NULL,
            phase                   INTEGER NOT NULL DEFAULT 1,
            config_fingerprint      TEXT NOT NULL DEFAULT '',
            predicted_success_rate  REAL NOT NULL DEFAULT 0.0,
            duration_seconds        REAL,
            build_time_seconds      REAL,
            document                TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_attempts_created_at ON deployment_attempts(created_at);
        CREATE INDEX IF NOT EXISTS idx_attempts_status ON deployment_attempts(status);
        CREATE INDEX IF NOT EXISTS idx_attempts_environment ON deployment_attempts(environment);
        CREATE INDEX IF NOT EXISTS idx_attempts_fingerprint ON deployment_attempts(config_fingerprint);
        CREATE INDEX IF NOT EXISTS idx_attempts_predicted ON deployment_attempts(predicted_success_rate);

        CREATE TABLE IF NOT EXISTS attempt_errors (
            deployment_id       TEXT NOT NULL,
            seq                 INTEGER NOT NULL,
            normalized_pattern  TEXT NOT NULL,
            raw_message         TEXT NOT NULL,
            error_type          TEXT NOT NULL,
            reported_at         TEXT NOT NULL,
            PRIMARY KEY (deployment_id, seq),
            FOREIGN KEY (deployment_id) REFERENCES deployment_attempts(deployment_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_attempt_errors_pattern ON attempt_errors(normalized_pattern);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
