//! formsub server binary.
//!
//! Reads `formsub.toml` (or the path given with `--config`), opens the
//! configured store and serves the form submission API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use formsub_core::{MemoryStore, Normalizer, SubmissionService, SubmissionStore};
use formsub_server::settings::{self, ServerConfig, StoreBackend};
use formsub_store_sqlite::SqliteStore;
use tokio::{net::TcpListener, signal};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Form submission server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "formsub.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = settings::load(Some(&cli.config))
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  match server_cfg.store.backend {
    StoreBackend::Memory => {
      tracing::warn!("using the in-memory store; submissions are lost on exit");
      serve(MemoryStore::new(), &server_cfg).await
    }
    StoreBackend::Sqlite => {
      let store_path = settings::expand_tilde(&server_cfg.store.path);
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?;
      tracing::info!(path = ?store_path, "opened sqlite store");
      serve(store, &server_cfg).await
    }
  }
}

async fn serve<S>(store: S, server_cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: SubmissionStore + 'static,
{
  let service = SubmissionService::new(Arc::new(store))
    .with_normalizer(Normalizer::new(server_cfg.exact_decimals));

  let app = formsub_server::router(service, server_cfg)
    .context("failed to build router")?;
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!("failed to install Ctrl+C handler: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!("failed to install SIGTERM handler: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }

  tracing::info!("Shutdown signal received, starting graceful shutdown");
}
