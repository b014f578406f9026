//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 with nanoseconds and a `Z` suffix. That
//! form is fixed-width, so ordering the text column orders by time. UUIDs are
//! stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use formsub_core::Submission;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const SELECT_COLUMNS: &str = "id, submitted_at, form_data";

/// Raw strings read directly from a `submissions` row.
pub struct RawSubmission {
  pub id:           String,
  pub submitted_at: String,
  pub form_data:    String,
}

impl RawSubmission {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      submitted_at: row.get(1)?,
      form_data:    row.get(2)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission::from_parts(
      decode_uuid(&self.id)?,
      decode_dt(&self.submitted_at)?,
      &self.form_data,
    )?)
  }
}
