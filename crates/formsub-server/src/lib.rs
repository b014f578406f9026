//! HTTP server wiring for formsub.
//!
//! Combines the JSON API with the pieces a deployed server needs around it:
//! a health probe, CORS for the browser frontend, optional static hosting of
//! that frontend and request tracing.

pub mod settings;
pub mod error;

pub use error::{Error, Result};

use axum::{
  Router,
  http::{HeaderValue, Method, header},
  routing::get,
};
use formsub_core::{SubmissionService, SubmissionStore};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  services::{ServeDir, ServeFile},
  trace::TraceLayer,
};

use settings::ServerConfig;

/// Body of a successful `GET /health`.
pub const HEALTHY: &str = "Healthy";

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
///
/// The API lives under `/api`. When `static_dir` is configured, every other
/// path is served from it, falling back to `index.html` so client-side routes
/// resolve.
pub fn router<S>(
  service: SubmissionService<S>,
  cfg: &ServerConfig,
) -> Result<Router>
where
  S: SubmissionStore + 'static,
{
  let mut app = Router::new()
    .route("/health", get(health))
    .nest("/api", formsub_api::api_router(service));

  if let Some(dir) = &cfg.static_dir {
    let index = dir.join("index.html");
    app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
  }

  Ok(
    app
      .layer(cors_layer(&cfg.cors_origins)?)
      .layer(TraceLayer::new_for_http()),
  )
}

async fn health() -> &'static str { HEALTHY }

/// CORS policy admitting exactly `origins`.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
  let origins = origins
    .iter()
    .map(|o| {
      HeaderValue::from_str(o).map_err(|_| Error::InvalidOrigin(o.clone()))
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(origins))
      .allow_methods([Method::GET, Method::POST])
      .allow_headers([header::CONTENT_TYPE]),
  )
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{path::PathBuf, sync::Arc};

  use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
  };
  use formsub_core::MemoryStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;
  use crate::settings::{StoreBackend, StoreConfig};

  fn test_config(static_dir: Option<PathBuf>) -> ServerConfig {
    ServerConfig {
      host:           "127.0.0.1".to_string(),
      port:           0,
      store:          StoreConfig {
        backend: StoreBackend::Memory,
        path:    PathBuf::from(":memory:"),
      },
      cors_origins:   vec!["http://localhost:5173".to_string()],
      static_dir,
      exact_decimals: true,
    }
  }

  fn app(cfg: &ServerConfig) -> Router {
    let service = SubmissionService::new(Arc::new(MemoryStore::new()));
    router(service, cfg).unwrap()
  }

  async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
  }

  #[tokio::test]
  async fn health_reports_healthy() {
    let resp = app(&test_config(None))
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, HEALTHY);
  }

  #[tokio::test]
  async fn api_is_nested_under_api_prefix() {
    let app = app(&test_config(None));
    let resp = app
      .clone()
      .oneshot(
        Request::post("/api/formsubmission")
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from(r#"{"fullName":"Alice"}"#))
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
      .oneshot(Request::get("/api/formsubmission").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let list: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn cors_preflight_allows_configured_origin() {
    let resp = app(&test_config(None))
      .oneshot(
        Request::builder()
          .method(Method::OPTIONS)
          .uri("/api/formsubmission")
          .header(header::ORIGIN, "http://localhost:5173")
          .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "http://localhost:5173"
    );
  }

  #[tokio::test]
  async fn cors_ignores_other_origins() {
    let resp = app(&test_config(None))
      .oneshot(
        Request::get("/api/formsubmission")
          .header(header::ORIGIN, "http://evil.test")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
  }

  #[test]
  fn invalid_origin_is_rejected() {
    let err = cors_layer(&["bad\norigin".to_string()]).unwrap_err();
    assert!(matches!(err, Error::InvalidOrigin(_)));
  }

  #[tokio::test]
  async fn static_dir_serves_spa_with_index_fallback() {
    let dir = std::env::temp_dir().join(format!("formsub-static-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<div id=app></div>").unwrap();
    std::fs::write(dir.join("app.js"), "console.log(1)").unwrap();

    let app = app(&test_config(Some(dir.clone())));

    let resp = app
      .clone()
      .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(body_text(resp).await, "console.log(1)");

    let resp = app
      .clone()
      .oneshot(Request::get("/submissions").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "<div id=app></div>");

    // API misses never fall through to the frontend.
    let resp = app
      .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let _ = std::fs::remove_dir_all(&dir);
  }
}
