//! Known-solution entries and the flattened `solutions` table.
//!
//! The parent row holds the full `KnownSolution` document; child rows mirror
//! each solution's ranking fields so top-N queries never decode documents
//! they will discard.

use rusqlite::{params, Connection, OptionalExtension};

use deployiq_core::errors::StorageError;
use deployiq_core::models::{ErrorType, KnownSolution, RankedSolution, Solution};
use deployiq_core::traits::StoreResult;

use super::{fmt_ts, from_document, like_contains, to_document};
use crate::to_storage_err;

const RECORD: &str = "known_solution";

pub fn get_known_solution(
    conn: &Connection,
    error_pattern: &str,
    error_type: ErrorType,
) -> StoreResult<Option<KnownSolution>> {
    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM known_solutions WHERE error_pattern = ?1 AND error_type = ?2",
            params![error_pattern, error_type.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    document.map(|json| from_document(RECORD, &json)).transpose()
}

/// Two error types may share a pattern; the more confident entry wins.
pub fn find_by_solution_id(
    conn: &Connection,
    error_pattern: &str,
    solution_id: &str,
) -> StoreResult<Option<KnownSolution>> {
    let document: Option<String> = conn
        .query_row(
            "SELECT k.document FROM known_solutions k
             JOIN solutions s
               ON s.error_pattern = k.error_pattern AND s.error_type = k.error_type
             WHERE s.error_pattern = ?1 AND s.id = ?2
             ORDER BY k.confidence DESC
             LIMIT 1",
            params![error_pattern, solution_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    document.map(|json| from_document(RECORD, &json)).transpose()
}

/// Entries whose pattern contains `issue_text`, most confident first.
pub fn search_known_solutions(
    conn: &Connection,
    issue_text: &str,
    error_type: Option<ErrorType>,
) -> StoreResult<Vec<KnownSolution>> {
    let mut stmt = conn
        .prepare(
            "SELECT document FROM known_solutions
             WHERE error_pattern LIKE ?1 ESCAPE '\\'
               AND (?2 IS NULL OR error_type = ?2)
             ORDER BY confidence DESC, updated_at DESC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(
            params![like_contains(issue_text), error_type.map(ErrorType::as_str)],
            |row| row.get::<_, String>(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let json = row.map_err(|e| to_storage_err(e.to_string()))?;
        results.push(from_document(RECORD, &json)?);
    }
    Ok(results)
}

/// Insert or replace an entry and re-mirror its solutions.
pub fn upsert_known_solution(conn: &Connection, known: &KnownSolution) -> StoreResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("upsert_known_solution begin: {e}")))?;
    let document = to_document(RECORD, known)?;
    let tags = to_document("known_solution.tags", &known.tags)?;
    let error_type = known.error_type.as_str();

    tx.execute(
        "INSERT INTO known_solutions (
            error_pattern, error_type, confidence, verified, occurrences, tags,
            created_at, updated_at, document
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(error_pattern, error_type) DO UPDATE SET
            confidence = excluded.confidence,
            verified = excluded.verified,
            occurrences = excluded.occurrences,
            tags = excluded.tags,
            updated_at = excluded.updated_at,
            document = excluded.document",
        params![
            known.error_pattern,
            error_type,
            known.confidence,
            known.verified,
            known.occurrences,
            tags,
            fmt_ts(known.created_at),
            fmt_ts(known.updated_at),
            document,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    tx.execute(
        "DELETE FROM solutions WHERE error_pattern = ?1 AND error_type = ?2",
        params![known.error_pattern, error_type],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    {
        let mut stmt = tx
            .prepare_cached(
                "INSERT INTO solutions (
                    id, error_pattern, error_type, effectiveness, success_rate,
                    times_applied, times_successful, automation_safe, last_used, document
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        for solution in &known.solutions {
            stmt.execute(params![
                solution.id,
                known.error_pattern,
                error_type,
                solution.effectiveness,
                solution.success_rate,
                solution.times_applied,
                solution.times_successful,
                solution.automation_safe,
                solution.last_used.map(fmt_ts),
                to_document("solution", solution)?,
            ])
            .map_err(|e| to_storage_err(e.to_string()))?;
        }
    }

    tx.commit()
        .map_err(|e| to_storage_err(format!("upsert_known_solution commit: {e}")))?;
    Ok(())
}

/// Proven solutions ranked by (effectiveness, success rate, usage).
pub fn top_solutions(
    conn: &Connection,
    min_applied: u32,
    min_success_rate: f64,
    limit: usize,
) -> StoreResult<Vec<RankedSolution>> {
    let mut stmt = conn
        .prepare(
            "SELECT s.error_pattern, s.error_type, k.verified, s.document
             FROM solutions s
             JOIN known_solutions k
               ON k.error_pattern = s.error_pattern AND k.error_type = s.error_type
             WHERE s.times_applied >= ?1 AND s.success_rate >= ?2
             ORDER BY s.effectiveness DESC, s.success_rate DESC, s.times_applied DESC
             LIMIT ?3",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![min_applied, min_success_rate, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut ranked = Vec::new();
    for row in rows {
        let (error_pattern, error_type, verified, json) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        let error_type = error_type
            .parse::<ErrorType>()
            .map_err(|value| StorageError::InvalidValue {
                field: "solutions.error_type".to_string(),
                value,
            })?;
        let solution: Solution = from_document("solution", &json)?;
        ranked.push(RankedSolution {
            error_pattern,
            error_type,
            verified,
            solution,
        });
    }
    Ok(ranked)
}
