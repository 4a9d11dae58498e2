//! Connection pragmas. The deployment history is small and write-light, so
//! the page cache stays modest; lock waits cover the monitor's retry window.

use rusqlite::Connection;

use deployiq_core::traits::StoreResult;

use crate::to_storage_err;

/// Shared by both sides of the pool.
const SESSION: &str = "PRAGMA cache_size = -16000; PRAGMA busy_timeout = 5000;";

/// Writer: WAL journal with NORMAL sync, foreign keys enforced for
/// `attempt_errors` and `solutions`.
pub fn apply_pragmas(conn: &Connection) -> StoreResult<()> {
    batch(
        conn,
        &format!("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA foreign_keys = ON; {SESSION}"),
    )
}

pub fn apply_read_pragmas(conn: &Connection) -> StoreResult<()> {
    batch(conn, &format!("PRAGMA query_only = ON; PRAGMA temp_store = MEMORY; {SESSION}"))
}

pub fn verify_wal_mode(conn: &Connection) -> StoreResult<bool> {
    conn.pragma_query_value(None, "journal_mode", |row| row.get::<_, String>(0))
        .map(|mode| mode.eq_ignore_ascii_case("wal"))
        .map_err(|e| to_storage_err(e.to_string()))
}

fn batch(conn: &Connection, sql: &str) -> StoreResult<()> {
    conn.execute_batch(sql).map_err(|e| to_storage_err(e.to_string()))
}
