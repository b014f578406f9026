//! [`MemoryStore`]: an in-process [`SubmissionStore`].
//!
//! Nothing survives the process. Submissions live in insertion order behind a
//! single `RwLock`, so every operation is one lock acquisition.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
  store::{SubmissionStore, sort_newest_first},
  submission::Submission,
};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
  #[error("submission {0} already exists")]
  DuplicateId(Uuid),
}

/// Cloning is cheap; clones share the same submissions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  submissions: Arc<RwLock<Vec<Submission>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  pub async fn len(&self) -> usize { self.submissions.read().await.len() }

  pub async fn is_empty(&self) -> bool {
    self.submissions.read().await.is_empty()
  }
}

impl SubmissionStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn insert(&self, submission: Submission) -> Result<Submission, MemoryStoreError> {
    let mut guard = self.submissions.write().await;
    if guard.iter().any(|s| s.id == submission.id) {
      return Err(MemoryStoreError::DuplicateId(submission.id));
    }
    guard.push(submission.clone());
    Ok(submission)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Submission>, MemoryStoreError> {
    let guard = self.submissions.read().await;
    Ok(guard.iter().find(|s| s.id == id).cloned())
  }

  async fn list_all_descending(&self) -> Result<Vec<Submission>, MemoryStoreError> {
    let mut all = self.submissions.read().await.clone();
    sort_newest_first(&mut all);
    Ok(all)
  }
}
