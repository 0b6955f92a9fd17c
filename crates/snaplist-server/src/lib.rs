//! snaplist HTTP API
//!
//! Exposes the stored snapshot over four routes plus a health probe:
//!
//! - `GET /` describes the API and the accepted save body shapes
//! - `GET /load` returns the stored list
//! - `POST /save` replaces the stored list
//! - `GET /clear` stores an empty list
//! - `GET /health` pings the store
//!
//! The router is built from an [`AppState`] so tests can drive it with an
//! in-memory store.

mod error;
mod handlers;

use std::future::Future;
use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use snaplist_core::api::paths;
use snaplist_core::SnapshotStore;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::{ApiError, StoreOperation};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
}

impl AppState {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }
}

/// Router options
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// Allow cross-origin requests from any origin
    pub cors: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self { cors: true }
    }
}

/// Build the API router
pub fn router(state: AppState, options: RouterOptions) -> Router {
    let router = Router::new()
        .route(paths::ROOT, get(handlers::capabilities))
        .route(paths::HEALTH, get(handlers::health))
        .route(paths::LOAD, get(handlers::load))
        .route(paths::SAVE, post(handlers::save))
        .route(paths::CLEAR, get(handlers::clear))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if options.cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

/// Serve the router on an already bound listener until `shutdown` resolves
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    if let Some(addr) = addr {
        info!("Listening on http://{}", addr);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C or SIGTERM
///
/// A listener that cannot be installed never resolves, so the server keeps
/// running on the remaining one.
pub async fn shutdown_signal() {
    let ctrl_c = wait_for_signal("Ctrl-C", signal::ctrl_c());
    #[cfg(unix)]
    let terminate = wait_for_signal("SIGTERM", async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut stream = signal(SignalKind::terminate())?;
        match stream.recv().await {
            Some(()) => Ok(()),
            None => Err(std::io::Error::other("signal stream closed")),
        }
    });
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Await a signal listener, parking forever if it fails
async fn wait_for_signal<F>(name: &str, listener: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = listener.await {
        warn!("Cannot listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}
