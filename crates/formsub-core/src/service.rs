//! [`SubmissionService`]: the three public operations.
//!
//! Validation and normalization run before the store is touched, so a
//! rejected payload never leaves anything behind. Store failures are passed
//! through untouched.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
  Error, Result,
  store::SubmissionStore,
  submission::Submission,
  value::{Normalizer, without_nulls},
};

pub const REQUIRED_MESSAGE: &str = "Form data is required";
pub const NOT_AN_OBJECT_MESSAGE: &str = "Form data must be a valid JSON object";

/// Parse a raw request body.
///
/// An empty (or whitespace-only) body is `Ok(None)`: the caller sent no form
/// data at all. Anything that is not JSON is [`Error::MalformedInput`].
pub fn parse_payload(body: &[u8]) -> Result<Option<Value>> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(None);
  }
  serde_json::from_slice(body).map(Some).map_err(|e| {
    tracing::debug!(error = %e, "request body is not JSON");
    Error::malformed(NOT_AN_OBJECT_MESSAGE)
  })
}

pub struct SubmissionService<S> {
  store:      Arc<S>,
  normalizer: Normalizer,
}

impl<S> Clone for SubmissionService<S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      normalizer: self.normalizer,
    }
  }
}

impl<S: SubmissionStore> SubmissionService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, normalizer: Normalizer::default() }
  }

  pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
    self.normalizer = normalizer;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Normalize and persist one form. `raw` is `None` when no body was sent.
  ///
  /// Null-valued fields are dropped here, so every backend stores and returns
  /// the same tree.
  pub async fn submit(&self, raw: Option<Value>) -> Result<Uuid> {
    let form_data = match raw {
      None | Some(Value::Null) => {
        return Err(Error::malformed(REQUIRED_MESSAGE));
      }
      Some(Value::Object(map)) => {
        without_nulls(self.normalizer.normalize_object(&map))
      }
      Some(_) => {
        return Err(Error::malformed(NOT_AN_OBJECT_MESSAGE));
      }
    };

    let saved = self
      .store
      .insert(Submission::new(form_data))
      .await
      .map_err(Error::store)?;

    tracing::info!(submission_id = %saved.id, "form submission saved");
    Ok(saved.id)
  }

  /// Every submission, newest first.
  pub async fn list(&self) -> Result<Vec<Submission>> {
    self.store.list_all_descending().await.map_err(Error::store)
  }

  /// `Ok(None)` when no submission has this id.
  pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Submission>> {
    self.store.get(id).await.map_err(Error::store)
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use serde_json::json;

  use super::*;
  use crate::{FormData, MemoryStore, NormalizedValue, value::form_data_equivalent};

  fn service() -> SubmissionService<MemoryStore> {
    SubmissionService::new(Arc::new(MemoryStore::new()))
  }

  #[tokio::test]
  async fn submit_persists_and_returns_id() {
    let svc = service();
    let id = svc
      .submit(Some(json!({
        "FullName": "Alice",
        "Newsletter": true,
        "Age": 28,
        "Tags": ["one", "two"],
      })))
      .await
      .unwrap();
    assert!(!id.is_nil());

    let stored = svc.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.form_data["FullName"].as_str(), Some("Alice"));
    assert_eq!(stored.form_data["Newsletter"], NormalizedValue::Bool(true));
    assert_eq!(stored.form_data["Age"], NormalizedValue::Int32(28));
    assert_eq!(
      stored.form_data["Tags"],
      NormalizedValue::List(vec![
        NormalizedValue::String("one".into()),
        NormalizedValue::String("two".into()),
      ])
    );
  }

  #[tokio::test]
  async fn non_objects_are_rejected_without_side_effects() {
    let svc = service();
    for raw in [
      None,
      Some(json!(null)),
      Some(json!([1, 2, 3])),
      Some(json!("text")),
      Some(json!(12)),
      Some(json!(true)),
    ] {
      let err = svc.submit(raw).await.unwrap_err();
      assert!(matches!(err, Error::MalformedInput(_)), "got {err:?}");
    }
    assert!(svc.list().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn list_returns_newest_first() {
    let svc = service();
    let mut ids = Vec::new();
    for a in 1..=3 {
      ids.push(svc.submit(Some(json!({ "A": a }))).await.unwrap());
      tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let all = svc.list().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all.iter().map(|s| s.id).collect::<Vec<_>>(), vec![
      ids[2], ids[1], ids[0]
    ]);
    assert_eq!(all[0].form_data["A"], NormalizedValue::Int32(3));
  }

  #[tokio::test]
  async fn get_by_id_distinguishes_submissions_and_misses() {
    let svc = service();
    svc.submit(Some(json!({ "Subject": "general" }))).await.unwrap();
    let id2 = svc.submit(Some(json!({ "Subject": "support" }))).await.unwrap();

    let sub2 = svc.get_by_id(id2).await.unwrap().unwrap();
    assert_eq!(sub2.form_data["Subject"].as_str(), Some("support"));

    assert!(svc.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn nested_structure_round_trips() {
    let svc = service();
    let raw = json!({
      "user": { "name": "Bob", "prefs": { "notify": true, "threshold": 10.5 } },
      "list": [1, 2, 3],
      "dropped": null,
    });
    let written = Normalizer::default().normalize_object(raw.as_object().unwrap());

    let id = svc.submit(Some(raw)).await.unwrap();
    let back = svc.get_by_id(id).await.unwrap().unwrap();

    assert!(form_data_equivalent(&written, &back.form_data));
    assert!(!back.form_data.contains_key("dropped"));
    let prefs = back.form_data["user"].as_map().unwrap()["prefs"]
      .as_map()
      .unwrap();
    assert_eq!(
      prefs["threshold"],
      NormalizedValue::Decimal("10.5".parse().unwrap())
    );
  }

  #[tokio::test]
  async fn null_fields_are_absent_when_read_back() {
    let svc = service();
    let id = svc
      .submit(Some(json!({
        "a": 1,
        "gone": null,
        "nested": { "x": null, "y": 2 },
        "items": [null, { "z": null }],
      })))
      .await
      .unwrap();

    let fetched = svc.get_by_id(id).await.unwrap().unwrap();
    let listed = svc.list().await.unwrap().remove(0);
    for form in [&fetched.form_data, &listed.form_data] {
      assert_eq!(form.keys().collect::<Vec<_>>(), ["a", "nested", "items"]);
      let nested = form["nested"].as_map().unwrap();
      assert_eq!(nested.keys().collect::<Vec<_>>(), ["y"]);
      assert_eq!(
        form["items"],
        NormalizedValue::List(vec![
          NormalizedValue::Null,
          NormalizedValue::Map(FormData::new()),
        ])
      );
    }
  }

  #[tokio::test]
  async fn rejection_messages() {
    let svc = service();
    let required = svc.submit(None).await.unwrap_err();
    assert_eq!(required.to_string(), format!("malformed input: {REQUIRED_MESSAGE}"));
    let not_object = svc.submit(Some(json!([1]))).await.unwrap_err();
    assert_eq!(
      not_object.to_string(),
      format!("malformed input: {NOT_AN_OBJECT_MESSAGE}")
    );
    let Error::MalformedInput(m) = parse_payload(b"{oops").unwrap_err() else {
      panic!("expected malformed input");
    };
    assert_eq!(m, NOT_AN_OBJECT_MESSAGE);
  }

  #[test]
  fn parse_payload_handles_empty_and_garbage() {
    assert!(parse_payload(b"").unwrap().is_none());
    assert!(parse_payload(b"  \n").unwrap().is_none());
    assert!(matches!(
      parse_payload(b"{not json").unwrap_err(),
      Error::MalformedInput(_)
    ));
    assert_eq!(parse_payload(b"null").unwrap(), Some(Value::Null));
  }

  // ── Store failures ─────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("disk on fire")]
  struct Broken;

  struct BrokenStore;

  impl SubmissionStore for BrokenStore {
    type Error = Broken;

    async fn insert(&self, _: Submission) -> Result<Submission, Broken> {
      Err(Broken)
    }

    async fn get(&self, _: Uuid) -> Result<Option<Submission>, Broken> {
      Err(Broken)
    }

    async fn list_all_descending(&self) -> Result<Vec<Submission>, Broken> {
      Err(Broken)
    }
  }

  #[tokio::test]
  async fn store_failures_pass_through() {
    let svc = SubmissionService::new(Arc::new(BrokenStore));

    let err = svc.submit(Some(json!({ "a": 1 }))).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(!err.is_client_error());

    assert!(matches!(svc.list().await.unwrap_err(), Error::Store(_)));
    assert!(matches!(
      svc.get_by_id(Uuid::new_v4()).await.unwrap_err(),
      Error::Store(_)
    ));
  }

  #[tokio::test]
  async fn validation_runs_before_the_store() {
    let svc = SubmissionService::new(Arc::new(BrokenStore));
    let err = svc.submit(Some(json!([]))).await.unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
  }
}
