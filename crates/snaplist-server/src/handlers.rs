//! HTTP handlers
//!
//! Handlers take no locks around the snapshot: two concurrent saves race at
//! the store and the last completed write wins.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snaplist_core::api::{
    Capabilities, ClearResponse, HealthResponse, SaveResponse, STORE_UNAVAILABLE,
};
use snaplist_core::snapshot::parse_payload;
use snaplist_core::{SnapshotStore, StoreError};
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, StoreOperation};
use crate::AppState;

/// `GET /`
pub async fn capabilities() -> Json<Capabilities> {
    Json(Capabilities::current())
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    let (store_connected, store_status) = match state.store.ping().await {
        Ok(reply) => (true, reply),
        Err(e) => {
            warn!("Health check ping failed: {}", e);
            (false, STORE_UNAVAILABLE.to_string())
        }
    };

    let (status, label) = if store_connected {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            store_connected,
            store_status,
        }),
    )
        .into_response()
}

/// `GET /load`
pub async fn load(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let items = state
        .store
        .load()
        .await
        .map_err(|e| store_failure(&state.store, StoreOperation::Load, e))?;

    debug!("Loaded {} item(s)", items.len());
    Ok(Json(items))
}

/// `POST /save`
///
/// The body is read raw so that malformed JSON is answered with the same
/// 400 body as a wrong shape.
pub async fn save(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ApiError> {
    debug!("Raw save body: {}", String::from_utf8_lossy(&body));

    let items = parse_payload(&body).map_err(|e| {
        warn!("Rejected save body: {}", e);
        ApiError::from(e)
    })?;

    state
        .store
        .save(&items)
        .await
        .map_err(|e| store_failure(&state.store, StoreOperation::Save, e))?;

    info!("Saved {} item(s)", items.len());
    Ok(Json(SaveResponse {
        status: "success".to_string(),
        saved: items,
        store_status: liveness(&state.store).await,
    }))
}

/// `GET /clear`
pub async fn clear(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
    state
        .store
        .clear()
        .await
        .map_err(|e| store_failure(&state.store, StoreOperation::Clear, e))?;

    info!("Cleared snapshot");
    Ok(Json(ClearResponse {
        status: "cleared".to_string(),
        store_status: liveness(&state.store).await,
    }))
}

/// Ping after a committed write; a failed ping does not fail the request
async fn liveness(store: &SnapshotStore) -> String {
    match store.ping().await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Store ping failed after write: {}", e);
            STORE_UNAVAILABLE.to_string()
        }
    }
}

fn store_failure(store: &SnapshotStore, operation: StoreOperation, source: StoreError) -> ApiError {
    error!("Store {} failed: {}", operation, source);
    ApiError::Store {
        operation,
        store_connected: store.is_connected(),
        source,
    }
}
