//! Async HTTP client wrapping the formsub JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use formsub_core::Submission;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// Body of a successful `POST /api/formsubmission`.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
  pub id:      Uuid,
  pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: String,
}

/// Async HTTP client for the formsub REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  /// `POST /api/formsubmission`
  pub async fn submit(&self, form: &Value) -> Result<SubmitResponse> {
    tracing::debug!(url = %self.url("/formsubmission"), "submitting form");
    let resp = self
      .client
      .post(self.url("/formsubmission"))
      .json(form)
      .send()
      .await
      .context("POST /formsubmission failed")?;

    if !resp.status().is_success() {
      return Err(failure("POST /formsubmission", resp).await);
    }
    resp.json().await.context("deserialising submit response")
  }

  /// `GET /api/formsubmission`
  pub async fn list(&self) -> Result<Vec<Submission>> {
    let resp = self
      .client
      .get(self.url("/formsubmission"))
      .send()
      .await
      .context("GET /formsubmission failed")?;

    if !resp.status().is_success() {
      return Err(failure("GET /formsubmission", resp).await);
    }
    resp.json().await.context("deserialising submissions")
  }

  /// `GET /api/formsubmission/{id}`. `Ok(None)` on 404.
  pub async fn get(&self, id: &str) -> Result<Option<Submission>> {
    let resp = self
      .client
      .get(self.url(&format!("/formsubmission/{id}")))
      .send()
      .await
      .with_context(|| format!("GET /formsubmission/{id} failed"))?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(failure("GET /formsubmission/{id}", resp).await);
    }
    resp.json().await.map(Some).context("deserialising submission")
  }
}

/// Turn a non-success response into an error, preferring the server's
/// `{"message"}` body over the bare status.
async fn failure(what: &str, resp: Response) -> anyhow::Error {
  let status = resp.status();
  match resp.json::<ErrorBody>().await {
    Ok(body) => anyhow!("{what} → {status}: {}", body.message),
    Err(_) => anyhow!("{what} → {status}"),
  }
}
