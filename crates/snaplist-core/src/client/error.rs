//! Sync client errors

use thiserror::Error;

use crate::api::ErrorBody;

/// Errors from talking to the snaplist API
///
/// None of these change local state; the caller decides whether to retry.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Transport failure: connection refused, reset, timed out
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server refused the request (4xx)
    #[error("Server rejected the request ({status}): {}", .body.error)]
    Rejected { status: u16, body: ErrorBody },

    /// Server failed to handle the request (5xx)
    #[error("Server error ({status}): {}", .body.error)]
    Server { status: u16, body: ErrorBody },

    /// Response did not have the expected shape
    #[error("Unexpected response from {url}: {details}")]
    UnexpectedResponse { url: String, details: String },
}

impl ClientError {
    /// Whether the request never got a response
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Request { .. })
    }

    /// Whether the request timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Request { source, .. } if source.is_timeout())
    }

    /// Server-provided hint, when the error body carried one
    pub fn solution(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { body, .. } | ClientError::Server { body, .. } => {
                body.solution.as_deref()
            }
            _ => None,
        }
    }
}

/// Result type for sync client calls
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display_uses_body() {
        let err = ClientError::Server {
            status: 500,
            body: ErrorBody {
                error: "Save failed".to_string(),
                solution: Some("Check that the store is running".to_string()),
                ..ErrorBody::default()
            },
        };

        assert_eq!(err.to_string(), "Server error (500): Save failed");
        assert_eq!(err.solution(), Some("Check that the store is running"));
        assert!(!err.is_network());
        assert!(!err.is_timeout());
    }
}
