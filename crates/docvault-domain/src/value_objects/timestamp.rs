//! Timestamp wire format
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision, so string ordering in the store equals chronological ordering.

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Format a timestamp for storage
pub fn format(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Format a timestamp as a JSON value for storage
pub fn to_value(ts: DateTime<Utc>) -> Value {
    Value::String(format(ts))
}

/// Parse a stored timestamp
pub fn parse(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::invalid_argument(format!("Invalid timestamp '{raw}': {e}")))
}

/// Parse an optional stored timestamp value (`null` yields `None`)
pub fn from_value(value: Option<&Value>) -> Result<Option<DateTime<Utc>>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => parse(raw).map(Some),
        Some(other) => Err(Error::invalid_argument(format!(
            "Expected timestamp string, found {other}"
        ))),
    }
}
