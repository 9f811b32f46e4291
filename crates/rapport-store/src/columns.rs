//! Column encoding shared by the row mappers.
//!
//! Timestamps are stored as fixed-width RFC 3339 (microseconds, `Z`) so that
//! comparing the text columns orders rows by time.

use chrono::{DateTime, SecondsFormat, Utc};
use rapport_shared::UserId;
use rusqlite::types::Type;
use uuid::Uuid;

pub(crate) fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn ts_from_sql(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn uuid_from_sql(idx: usize, raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn user_id_from_sql(idx: usize, raw: &str) -> rusqlite::Result<UserId> {
    uuid_from_sql(idx, raw).map(UserId)
}
