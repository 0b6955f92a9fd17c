//! snaplist server
//!
//! HTTP API persisting the todo snapshot in a key-value store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use snaplist_core::store::{open_store, KeyValueStore};
use snaplist_core::{Config, SnapshotStore};
use snaplist_server::{router, serve_with_shutdown, shutdown_signal, AppState, RouterOptions};

#[derive(Parser)]
#[command(name = "snaplist-server")]
#[command(about = "snaplist - HTTP API for the todo snapshot")]
#[command(version)]
struct Args {
    /// Config file (defaults to ~/.config/snaplist/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:3001
    #[arg(short, long)]
    bind: Option<String>,

    /// Store URL: redis://host:port, sqlite://path or memory://
    #[arg(short, long)]
    store: Option<String>,

    /// Disable the permissive CORS layer
    #[arg(long)]
    no_cors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("snaplist_server=info,snaplist_core=info,tower_http=info")
    });
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(store) = args.store {
        config.store_url = store;
    }

    info!("Connecting to store at {}", config.store_url);
    let kv: Arc<dyn KeyValueStore> = open_store(&config.store_url, config.reconnect_policy())
        .await
        .map_err(|e| {
            warn!("{}", e.recovery_suggestion());
            e
        })
        .with_context(|| format!("Failed to open store {}", config.store_url))?;

    let store = SnapshotStore::new(kv);
    if store
        .initialize()
        .await
        .context("Failed to initialize snapshot")?
    {
        info!("Initialized empty snapshot");
    }

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    let app = router(
        AppState::new(store.clone()),
        RouterOptions {
            cors: !args.no_cors,
        },
    );

    let served = serve_with_shutdown(listener, app, shutdown_signal()).await;

    store.close().await;
    info!("Store connection closed");

    served.context("Server error")
}
