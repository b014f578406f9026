//! One persisted form submission.
//!
//! A submission is created exactly once by a successful submit and never
//! changes afterwards. The public JSON shape is
//! `{ "id", "formData", "submittedAt" }`; field names inside `formData` are
//! kept exactly as submitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  value::{FormData, serialize_form_data},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
  pub id:           Uuid,
  /// Null-valued entries are omitted whenever this is serialised.
  #[serde(serialize_with = "serialize_form_data")]
  pub form_data:    FormData,
  /// Server-assigned; never changes after creation.
  pub submitted_at: DateTime<Utc>,
}

impl Submission {
  /// Wrap normalized form data with a fresh id and the current UTC instant.
  pub fn new(form_data: FormData) -> Self {
    Self {
      id: Uuid::new_v4(),
      form_data,
      submitted_at: Utc::now(),
    }
  }

  /// Compact JSON for the persisted `form_data` column.
  pub fn form_data_json(&self) -> Result<String> {
    Ok(serde_json::to_string(&PersistedForm(&self.form_data))?)
  }

  /// Rebuild a submission from its persisted parts.
  pub fn from_parts(
    id: Uuid,
    submitted_at: DateTime<Utc>,
    form_data_json: &str,
  ) -> Result<Self> {
    Ok(Self {
      id,
      form_data: serde_json::from_str(form_data_json)?,
      submitted_at,
    })
  }
}

/// Serialises a [`FormData`] the way it is persisted.
struct PersistedForm<'a>(&'a FormData);

impl Serialize for PersistedForm<'_> {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serialize_form_data(self.0, serializer)
  }
}
