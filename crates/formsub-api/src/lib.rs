//! JSON REST API for formsub.
//!
//! Exposes an axum [`Router`] backed by a [`SubmissionService`] over any
//! [`formsub_core::SubmissionStore`]. TLS, CORS and static hosting are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", formsub_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod submissions;

use axum::{Router, routing::get};
use formsub_core::{SubmissionService, SubmissionStore};

pub use error::ApiError;

/// Build the API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type. Unknown paths under it answer with a JSON 404
/// instead of falling through to the parent's fallback.
pub fn api_router<S>(service: SubmissionService<S>) -> Router<()>
where
  S: SubmissionStore + 'static,
{
  Router::new()
    .route(
      "/formsubmission",
      get(submissions::list::<S>).post(submissions::submit::<S>),
    )
    .route("/formsubmission/{id}", get(submissions::get_one::<S>))
    .fallback(|| async { ApiError::NotFound("no such endpoint".to_owned()) })
    .with_state(service)
}

// ─── Integration tests ────────────────────────────────────────────────────────
