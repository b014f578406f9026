//! The `SubmissionStore` trait.
//!
//! Implemented by storage backends ([`crate::MemoryStore`],
//! `formsub-store-sqlite`). The service and HTTP layers depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::submission::Submission;

/// Abstraction over a submission store backend.
///
/// The store is append-only: there is no update or delete. Each method must
/// be atomic on its own and safe to call from many tasks at once; the
/// backend owns its internal synchronisation.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SubmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a fully-built submission and return it. Fails if the id is
  /// already taken.
  fn insert(
    &self,
    submission: Submission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  /// Retrieve a submission by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// All submissions, newest `submitted_at` first. Equal timestamps keep
  /// insertion order.
  fn list_all_descending(
    &self,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;
}

/// Stable sort, newest first. Ties keep their existing relative order.
pub fn sort_newest_first(submissions: &mut [Submission]) {
  submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
}
