//! Error types for `formsub-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The payload was absent, not JSON, not an object, or contained the
  /// undefined sentinel. Always the caller's fault.
  #[error("malformed input: {0}")]
  MalformedInput(String),

  /// Any failure reported by the persistence backend.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn malformed(message: impl Into<String>) -> Self {
    Self::MalformedInput(message.into())
  }

  /// Wrap a backend error without interpreting it.
  pub fn store<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(error))
  }

  pub fn is_client_error(&self) -> bool {
    matches!(self, Self::MalformedInput(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
