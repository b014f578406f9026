//! Runtime configuration.
//!
//! Layered, lowest precedence first: built-in defaults, the optional TOML
//! file, then `FORMSUB_*` environment variables. Nested keys use `__` in the
//! environment (`FORMSUB_STORE__BACKEND=sqlite`); `FORMSUB_CORS_ORIGINS` is a
//! comma-separated list.

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use serde::Deserialize;

use crate::Result;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5180;
pub const DEFAULT_STORE_PATH: &str = "formsub.db";
pub const DEFAULT_CORS_ORIGINS: [&str; 2] =
  ["http://localhost:5173", "https://localhost:5173"];

// ─── Types ────────────────────────────────────────────────────────────────────

/// Which [`formsub_core::SubmissionStore`] backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  /// Lost on restart.
  Memory,
  Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  pub backend: StoreBackend,
  /// SQLite file; ignored by the memory backend. A leading `~/` is expanded.
  pub path:    PathBuf,
}

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store:          StoreConfig,
  /// Origins allowed to call the API from a browser.
  #[serde(default)]
  pub cors_origins:   Vec<String>,
  /// Directory holding a built single-page frontend, served for every
  /// non-API path with `index.html` as the fallback.
  #[serde(default)]
  pub static_dir:     Option<PathBuf>,
  /// Keep fractional numbers as exact decimals instead of `f64`.
  pub exact_decimals: bool,
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Loading ──────────────────────────────────────────────────────────────────

/// Load configuration from defaults, `path` (if it exists) and the process
/// environment.
pub fn load(path: Option<&Path>) -> Result<ServerConfig> {
  load_with_env(path, None)
}

/// `env` replaces the process environment when set.
fn load_with_env(
  path: Option<&Path>,
  env: Option<config::Map<String, String>>,
) -> Result<ServerConfig> {
  let mut builder = Config::builder()
    .set_default("host", DEFAULT_HOST)?
    .set_default("port", i64::from(DEFAULT_PORT))?
    .set_default("store.backend", "memory")?
    .set_default("store.path", DEFAULT_STORE_PATH)?
    .set_default("cors_origins", DEFAULT_CORS_ORIGINS.to_vec())?
    .set_default("exact_decimals", true)?;

  if let Some(path) = path {
    builder = builder.add_source(config::File::from(path).required(false));
  }

  let environment = Environment::with_prefix("FORMSUB")
    .prefix_separator("_")
    .separator("__")
    .list_separator(",")
    .with_list_parse_key("cors_origins")
    .try_parsing(true)
    .source(env);

  Ok(builder.add_source(environment).build()?.try_deserialize()?)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
