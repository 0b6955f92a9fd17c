//! API errors and their HTTP rendering

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snaplist_core::api::ErrorBody;
use snaplist_core::snapshot::accepted_formats;
use snaplist_core::{StoreError, ValidationError};
use thiserror::Error;

/// Route that touched the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Load,
    Save,
    Clear,
}

impl StoreOperation {
    /// Headline of the error body
    fn message(self) -> &'static str {
        match self {
            StoreOperation::Load => "Failed to load todos",
            StoreOperation::Save => "Save failed",
            StoreOperation::Clear => "Clear failed",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOperation::Load => write!(f, "load"),
            StoreOperation::Save => write!(f, "save"),
            StoreOperation::Clear => write!(f, "clear"),
        }
    }
}

/// Errors returned by the API handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Save body did not match an accepted shape (400)
    #[error("Invalid data format: {0}")]
    Validation(#[from] ValidationError),

    /// Store read or write failed (500)
    #[error("Store {operation} failed: {source}")]
    Store {
        operation: StoreOperation,
        store_connected: bool,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Validation(e) => ErrorBody {
                error: "Invalid data format".to_string(),
                detail: Some(e.to_string()),
                accepted_formats: Some(accepted_formats()),
                received: Some(e.received()),
                ..ErrorBody::default()
            },
            ApiError::Store {
                operation,
                store_connected,
                source,
            } => {
                let solution = Some(source.recovery_suggestion().to_string());
                let detail = Some(source.to_string());
                match operation {
                    StoreOperation::Load => ErrorBody {
                        error: operation.message().to_string(),
                        solution,
                        detail,
                        ..ErrorBody::default()
                    },
                    StoreOperation::Save => ErrorBody {
                        error: operation.message().to_string(),
                        store_connected: Some(*store_connected),
                        solution,
                        detail,
                        ..ErrorBody::default()
                    },
                    StoreOperation::Clear => ErrorBody {
                        error: operation.message().to_string(),
                        store_connected: Some(*store_connected),
                        detail,
                        ..ErrorBody::default()
                    },
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_body() {
        let err = ApiError::from(ValidationError::UnsupportedShape {
            received: json!({"bogus": 1}),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let body = err.body();
        assert_eq!(body.error, "Invalid data format");
        assert_eq!(body.received, Some(json!({"bogus": 1})));
        assert!(body.accepted_formats.is_some());
        assert!(body.store_connected.is_none());
    }

    #[test]
    fn test_store_bodies_per_operation() {
        let failure = || StoreError::Injected("offline".to_string());

        let load = ApiError::Store {
            operation: StoreOperation::Load,
            store_connected: false,
            source: failure(),
        }
        .body();
        assert_eq!(load.error, "Failed to load todos");
        assert!(load.solution.is_some());
        assert!(load.store_connected.is_none());

        let save = ApiError::Store {
            operation: StoreOperation::Save,
            store_connected: false,
            source: failure(),
        }
        .body();
        assert_eq!(save.store_connected, Some(false));
        assert!(save.solution.is_some());

        let clear = ApiError::Store {
            operation: StoreOperation::Clear,
            store_connected: true,
            source: failure(),
        }
        .body();
        assert_eq!(clear.error, "Clear failed");
        assert_eq!(clear.store_connected, Some(true));
        assert!(clear.detail.unwrap().contains("offline"));
    }
}
