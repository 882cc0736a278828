//! Timestamp encoding for SQLite text columns.

use crate::db::error::DbError;
use chrono::{DateTime, SecondsFormat, Utc};
use mastery_core::{is_storable_timestamp, MIN_RECORD_TIMESTAMP_MS};

/// Encoding of the last storable instant.
const LATEST_SQL_TIMESTAMP: &str = "9999-12-31T23:59:59.999999999Z";

/// Fixed-width RFC 3339 in UTC, so string order equals time order.
///
/// Only four-digit years keep that property; use `to_stored_timestamp` for writes.
pub fn to_sql_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Encode a value for a record column, refusing what could not be read back.
pub fn to_stored_timestamp(value: DateTime<Utc>) -> Result<String, DbError> {
    if !is_storable_timestamp(value) {
        return Err(DbError::InvalidData(format!(
            "timestamp {value} is outside the storable range"
        )));
    }
    Ok(to_sql_timestamp(value))
}

/// Encode an inclusive upper bound for range queries, clamped to the storable
/// range. `None` when the bound precedes every storable instant.
pub fn to_sql_upper_bound(value: DateTime<Utc>) -> Option<String> {
    if value.timestamp_millis() < MIN_RECORD_TIMESTAMP_MS {
        None
    } else if is_storable_timestamp(value) {
        Some(to_sql_timestamp(value))
    } else {
        Some(LATEST_SQL_TIMESTAMP.to_string())
    }
}

/// Parse a stored timestamp.
pub fn parse_sql_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
