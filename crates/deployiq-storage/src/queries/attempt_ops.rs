//! Insert, upsert, get, and pattern search for deployment attempts.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use deployiq_core::models::DeploymentAttempt;
use deployiq_core::traits::StoreResult;

use super::{fmt_ts, from_document, like_contains, to_document};
use crate::to_storage_err;

const RECORD: &str = "deployment_attempt";

/// Insert an attempt unless its id already exists. Returns false when it did.
pub fn insert_attempt(conn: &Connection, attempt: &DeploymentAttempt) -> StoreResult<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("insert_attempt begin: {e}")))?;
    let document = to_document(RECORD, attempt)?;

    let inserted = tx
        .execute(
            "INSERT INTO deployment_attempts (
                deployment_id, created_at, updated_at, environment, status, phase,
                config_fingerprint, predicted_success_rate, duration_seconds,
                build_time_seconds, document
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(deployment_id) DO NOTHING",
            params![
                attempt.deployment_id,
                fmt_ts(attempt.created_at),
                fmt_ts(attempt.updated_at),
                attempt.environment,
                attempt.status.as_str(),
                attempt.phase.ordinal(),
                attempt.config_fingerprint,
                attempt.predicted_success_rate,
                attempt.duration_seconds,
                attempt.build_time_seconds,
                document,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if inserted == 0 {
        // Nothing written; dropping the transaction rolls it back.
        return Ok(false);
    }
    replace_errors(&tx, attempt)?;
    tx.commit()
        .map_err(|e| to_storage_err(format!("insert_attempt commit: {e}")))?;
    Ok(true)
}

/// Insert or fully replace an attempt and its error index rows.
pub fn upsert_attempt(conn: &Connection, attempt: &DeploymentAttempt) -> StoreResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("upsert_attempt begin: {e}")))?;
    let document = to_document(RECORD, attempt)?;

    tx.execute(
        "INSERT INTO deployment_attempts (
            deployment_id, created_at, updated_at, environment, status, phase,
            config_fingerprint, predicted_success_rate, duration_seconds,
            build_time_seconds, document
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(deployment_id) DO UPDATE SET
            updated_at = excluded.updated_at,
            environment = excluded.environment,
            status = excluded.status,
            phase = excluded.phase,
            config_fingerprint = excluded.config_fingerprint,
            predicted_success_rate = excluded.predicted_success_rate,
            duration_seconds = excluded.duration_seconds,
            build_time_seconds = excluded.build_time_seconds,
            document = excluded.document",
        params![
            attempt.deployment_id,
            fmt_ts(attempt.created_at),
            fmt_ts(attempt.updated_at),
            attempt.environment,
            attempt.status.as_str(),
            attempt.phase.ordinal(),
            attempt.config_fingerprint,
            attempt.predicted_success_rate,
            attempt.duration_seconds,
            attempt.build_time_seconds,
            document,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    replace_errors(&tx, attempt)?;
    tx.commit()
        .map_err(|e| to_storage_err(format!("upsert_attempt commit: {e}")))?;
    Ok(())
}

fn replace_errors(conn: &Connection, attempt: &DeploymentAttempt) -> StoreResult<()> {
    conn.execute(
        "DELETE FROM attempt_errors WHERE deployment_id = ?1",
        params![attempt.deployment_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO attempt_errors (
                deployment_id, seq, normalized_pattern, raw_message, error_type, reported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    for (seq, error) in attempt.errors.iter().enumerate() {
        stmt.execute(params![
            attempt.deployment_id,
            seq as i64,
            error.normalized_pattern,
            error.raw_message,
            error.error_type.as_str(),
            fmt_ts(error.reported_at),
        ])
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

pub fn get_attempt(conn: &Connection, deployment_id: &str) -> StoreResult<Option<DeploymentAttempt>> {
    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM deployment_attempts WHERE deployment_id = ?1",
            params![deployment_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    document.map(|json| from_document(RECORD, &json)).transpose()
}

/// Attempts with at least one error whose pattern or raw message contains
/// `pattern`, newest first.
pub fn find_attempts_by_error(
    conn: &Connection,
    pattern: &str,
    limit: usize,
) -> StoreResult<Vec<DeploymentAttempt>> {
    let mut stmt = conn
        .prepare(
            "SELECT document FROM deployment_attempts
             WHERE deployment_id IN (
                 SELECT deployment_id FROM attempt_errors
                 WHERE normalized_pattern LIKE ?1 ESCAPE '\\'
                    OR raw_message LIKE ?1 ESCAPE '\\'
             )
             ORDER BY created_at DESC
             LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_documents(&mut stmt, params![like_contains(pattern), limit as i64])
}

/// Number of distinct attempts with an error matching `pattern`.
pub fn count_attempts_by_error(conn: &Connection, pattern: &str) -> StoreResult<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(DISTINCT deployment_id) FROM attempt_errors
             WHERE normalized_pattern LIKE ?1 ESCAPE '\\'
                OR raw_message LIKE ?1 ESCAPE '\\'",
            params![like_contains(pattern)],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

/// Attempts created at or after `from`, newest first.
pub fn query_attempts_since(
    conn: &Connection,
    from: DateTime<Utc>,
    limit: usize,
) -> StoreResult<Vec<DeploymentAttempt>> {
    let mut stmt = conn
        .prepare(
            "SELECT document FROM deployment_attempts
             WHERE created_at >= ?1
             ORDER BY created_at DESC
             LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_documents(&mut stmt, params![fmt_ts(from), limit as i64])
}

fn collect_documents(
    stmt: &mut rusqlite::Statement<'_>,
    params: &[&dyn rusqlite::ToSql],
) -> StoreResult<Vec<DeploymentAttempt>> {
    let rows = stmt
        .query_map(params, |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut attempts = Vec::new();
    for row in rows {
        let json = row.map_err(|e| to_storage_err(e.to_string()))?;
        attempts.push(from_document(RECORD, &json)?);
    }
    Ok(attempts)
}
