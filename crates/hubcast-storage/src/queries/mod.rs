// SPDX-FileCopyrightText: 2026 Hubcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table.

pub mod posts;
pub mod registry;
pub mod submissions;
pub mod targets;

use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Parses an RFC3339 column value, reporting failures as conversion errors
/// on the given column index.
pub(crate) fn parse_ts(col: usize, raw: String) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn parse_opt_ts(
    col: usize,
    raw: Option<String>,
) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    raw.map(|s| parse_ts(col, s)).transpose()
}

/// Parses a JSON column into a typed value.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    col: usize,
    raw: String,
) -> Result<T, rusqlite::Error> {
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parses an enum column stored as its display string.
pub(crate) fn parse_enum<T>(col: usize, raw: String) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Serializes a value into a JSON column, mapping failures onto rusqlite's
/// boxed-error variant so callers stay inside `call()` closures.
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String, rusqlite::Error> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
