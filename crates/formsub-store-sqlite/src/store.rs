//! [`SqliteStore`]: the SQLite implementation of [`SubmissionStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use formsub_core::{Submission, SubmissionStore};

use crate::{
  Result,
  encode::{RawSubmission, SELECT_COLUMNS, encode_dt, encode_uuid},
  error::Error,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A submission store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every
/// operation is a single statement on the connection thread, which makes each
/// one atomic with respect to the others.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, submission: Submission) -> Result<Submission> {
    let id_str        = encode_uuid(submission.id);
    let at_str        = encode_dt(submission.submitted_at);
    let form_data_str = submission.form_data_json()?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO submissions (id, submitted_at, form_data) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, at_str, form_data_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(submission_id = %submission.id, "submission row inserted");
    Ok(submission)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Submission>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SELECT_COLUMNS} FROM submissions WHERE id = ?1"),
              rusqlite::params![id_str],
              RawSubmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn list_all_descending(&self) -> Result<Vec<Submission>> {
    let raws: Vec<RawSubmission> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SELECT_COLUMNS} FROM submissions
           ORDER BY submitted_at DESC, seq ASC"
        ))?;
        let rows = stmt
          .query_map([], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }
}
