//! Build-pattern lookups and upserts.

use rusqlite::{params, Connection, OptionalExtension};

use deployiq_core::models::BuildPattern;
use deployiq_core::traits::StoreResult;

use super::{fmt_ts, from_document, to_document};
use crate::to_storage_err;

const RECORD: &str = "build_pattern";

pub fn get_build_pattern(conn: &Connection, fingerprint: &str) -> StoreResult<Option<BuildPattern>> {
    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM build_patterns WHERE fingerprint = ?1",
            params![fingerprint],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    document.map(|json| from_document(RECORD, &json)).transpose()
}

/// Patterns sharing runtime and framework version. `IS` makes an unknown
/// version match other unknown versions.
pub fn find_build_patterns(
    conn: &Connection,
    runtime_version: Option<&str>,
    framework_version: Option<&str>,
) -> StoreResult<Vec<BuildPattern>> {
    let mut stmt = conn
        .prepare(
            "SELECT document FROM build_patterns
             WHERE runtime_version IS ?1 AND framework_version IS ?2
             ORDER BY last_updated DESC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![runtime_version, framework_version], |row| {
            row.get::<_, String>(0)
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut patterns = Vec::new();
    for row in rows {
        let json = row.map_err(|e| to_storage_err(e.to_string()))?;
        patterns.push(from_document(RECORD, &json)?);
    }
    Ok(patterns)
}

pub fn upsert_build_pattern(conn: &Connection, pattern: &BuildPattern) -> StoreResult<()> {
    let document = to_document(RECORD, pattern)?;
    conn.execute(
        "INSERT INTO build_patterns (
            fingerprint, runtime_version, framework_version, success_count,
            failure_count, success_rate, last_updated, document
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(fingerprint) DO UPDATE SET
            runtime_version = excluded.runtime_version,
            framework_version = excluded.framework_version,
            success_count = excluded.success_count,
            failure_count = excluded.failure_count,
            success_rate = excluded.success_rate,
            last_updated = excluded.last_updated,
            document = excluded.document",
        params![
            pattern.fingerprint,
            pattern.runtime_version,
            pattern.framework_version,
            pattern.success_count,
            pattern.failure_count,
            pattern.success_rate,
            fmt_ts(pattern.last_updated),
            document,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
