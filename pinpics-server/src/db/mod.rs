pub mod schema;
pub mod connection;
pub mod repositories;

pub use connection::{Database, DbPool};

use chrono::{DateTime, Utc};

/// Read an RFC3339 TEXT column as a UTC timestamp
pub(crate) fn timestamp_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
