//! Handlers for `/formsubmission` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/formsubmission` | Body: any JSON object; returns 200 + `{"id","message"}` |
//! | `GET`  | `/formsubmission` | All submissions, newest first |
//! | `GET`  | `/formsubmission/{id}` | 404 if not found |

use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use formsub_core::{
  Submission, SubmissionService, SubmissionStore, service::parse_payload,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

pub const SUBMITTED_MESSAGE: &str = "Form submitted successfully";
pub const NOT_FOUND_MESSAGE: &str = "Submission not found";

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
  pub id:      Uuid,
  pub message: &'static str,
}

/// `POST /formsubmission`: the raw body is the form data.
///
/// The body is read as bytes rather than through `Json` so that a missing
/// body, broken JSON and a non-object all surface as the same 400 shape.
pub async fn submit<S>(
  State(service): State<SubmissionService<S>>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubmissionStore + 'static,
{
  let payload = parse_payload(&body)?;
  let id = service.submit(payload).await?;
  Ok((
    StatusCode::OK,
    Json(SubmitResponse { id, message: SUBMITTED_MESSAGE }),
  ))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /formsubmission`
pub async fn list<S>(
  State(service): State<SubmissionService<S>>,
) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: SubmissionStore + 'static,
{
  Ok(Json(service.list().await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /formsubmission/{id}`
///
/// An id that is not a UUID cannot belong to any submission, so it is a 404
/// like any other miss.
pub async fn get_one<S>(
  State(service): State<SubmissionService<S>>,
  Path(id): Path<String>,
) -> Result<Json<Submission>, ApiError>
where
  S: SubmissionStore + 'static,
{
  let not_found = || ApiError::NotFound(NOT_FOUND_MESSAGE.to_owned());
  let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
  let submission = service.get_by_id(id).await?.ok_or_else(not_found)?;
  Ok(Json(submission))
}
