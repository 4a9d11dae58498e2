//! Time-window aggregations backing deployment insights.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use deployiq_core::errors::StorageError;
use deployiq_core::models::{DeploymentStatus, ErrorPatternCount, ErrorType, StatusSummary};
use deployiq_core::traits::StoreResult;

use super::fmt_ts;
use crate::to_storage_err;

/// Count, mean duration, and mean build time per status since `since`.
pub fn status_summary(conn: &Connection, since: DateTime<Utc>) -> StoreResult<Vec<StatusSummary>> {
    let mut stmt = conn
        .prepare(
            "SELECT status, COUNT(*), AVG(duration_seconds), AVG(build_time_seconds)
             FROM deployment_attempts
             WHERE created_at >= ?1
             GROUP BY status
             ORDER BY COUNT(*) DESC, status ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![fmt_ts(since)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<f64>>(3)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let (status, count, avg_duration, avg_build) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        let status = status
            .parse::<DeploymentStatus>()
            .map_err(|value| StorageError::InvalidValue {
                field: "deployment_attempts.status".to_string(),
                value,
            })?;
        results.push(StatusSummary {
            status,
            count: count as u64,
            avg_duration_seconds: avg_duration,
            avg_build_time_seconds: avg_build,
        });
    }
    Ok(results)
}

/// Most frequent (pattern, error type) pairs among attempts since `since`.
pub fn top_error_patterns(
    conn: &Connection,
    since: DateTime<Utc>,
    limit: usize,
) -> StoreResult<Vec<ErrorPatternCount>> {
    let mut stmt = conn
        .prepare(
            "SELECT e.normalized_pattern, e.error_type, COUNT(*) AS n
             FROM attempt_errors e
             JOIN deployment_attempts a ON a.deployment_id = e.deployment_id
             WHERE a.created_at >= ?1
             GROUP BY e.normalized_pattern, e.error_type
             ORDER BY n DESC, e.normalized_pattern ASC
             LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![fmt_ts(since), limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let (pattern, error_type, count) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let error_type = error_type
            .parse::<ErrorType>()
            .map_err(|value| StorageError::InvalidValue {
                field: "attempt_errors.error_type".to_string(),
                value,
            })?;
        results.push(ErrorPatternCount {
            pattern,
            error_type,
            count: count as u64,
        });
    }
    Ok(results)
}
