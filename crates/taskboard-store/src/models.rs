//! Domain models persisted in the database, plus the column codecs shared by
//! the CRUD modules.
//!
//! The models themselves live in `taskboard-shared` because the client
//! deserializes the same shapes from the HTTP API.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;
use uuid::Uuid;

pub use taskboard_shared::types::{Task, User};

/// Current time at the precision the database stores.
///
/// Values returned to callers must compare equal to what a later read
/// produces, so sub-microsecond digits are dropped up front.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 text. Lexical order of these strings is
/// chronological order, which `ORDER BY created_at` and `MAX(updated_at, ?)`
/// rely on.
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn decode_uuid(idx: usize, text: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
