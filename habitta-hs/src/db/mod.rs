//! Database operations for habitta-hs
//!
//! Thin sqlx wrappers around the shared schema. All enum-valued and
//! JSON columns are validated here, at the storage boundary; corrupt
//! rows surface as errors instead of defaulted values.

pub mod decisions;
pub mod homes;
pub mod systems;
pub mod tasks;
pub mod updates;

use chrono::{DateTime, NaiveDateTime, Utc};
use habitta_common::{Error, Result};

/// Parse a stored timestamp.
///
/// Rows written by this service carry RFC 3339; rows created through
/// SQLite's CURRENT_TIMESTAMP default use `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::CorruptRecord(format!("unparseable timestamp '{raw}'")))
}

pub(crate) fn parse_uuid(raw: &str, column: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw)
        .map_err(|_| Error::CorruptRecord(format!("invalid uuid in {column}: '{raw}'")))
}
