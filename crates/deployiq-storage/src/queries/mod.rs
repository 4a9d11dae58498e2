//! Query modules, one per collection, plus shared row helpers.

pub mod aggregation;
pub mod attempt_ops;
pub mod pattern_ops;
pub mod solution_ops;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use deployiq_core::errors::StorageError;
use deployiq_core::traits::StoreResult;

/// Fixed-width UTC timestamps so lexical order equals time order.
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn to_document<T: Serialize>(record: &str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization {
        record: record.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn from_document<T: DeserializeOwned>(record: &str, json: &str) -> StoreResult<T> {
    serde_json::from_str(json).map_err(|e| StorageError::Serialization {
        record: record.to_string(),
        message: e.to_string(),
    })
}

/// `LIKE` operand matching `needle` anywhere. SQLite's `LIKE` is already
/// case-insensitive for ASCII; wildcards in the needle are escaped with `\`.
pub(crate) fn like_contains(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
