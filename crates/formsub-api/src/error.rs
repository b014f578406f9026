//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Body sent for every 500; internal detail stays in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<formsub_core::Error> for ApiError {
  fn from(e: formsub_core::Error) -> Self {
    match e {
      formsub_core::Error::MalformedInput(m) => ApiError::BadRequest(m),
      formsub_core::Error::Store(inner) => ApiError::Internal(inner),
      other => ApiError::Internal(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => {
        tracing::debug!(reason = %m, "rejected request");
        (StatusCode::BAD_REQUEST, m.clone())
      }
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          INTERNAL_ERROR_MESSAGE.to_owned(),
        )
      }
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}
