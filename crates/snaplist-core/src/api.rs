//! HTTP wire types shared by the server and the sync client
//!
//! | Method/Path  | Success body        | Failure body          |
//! |--------------|---------------------|-----------------------|
//! | `GET /`      | [`Capabilities`]    |                       |
//! | `GET /health`| [`HealthResponse`]  | [`HealthResponse`]    |
//! | `GET /load`  | `["..", ".."]`      | [`ErrorBody`]         |
//! | `POST /save` | [`SaveResponse`]    | [`ErrorBody`]         |
//! | `GET /clear` | [`ClearResponse`]   | [`ErrorBody`]         |

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Route paths
pub mod paths {
    pub const ROOT: &str = "/";
    pub const HEALTH: &str = "/health";
    pub const LOAD: &str = "/load";
    pub const SAVE: &str = "/save";
    pub const CLEAR: &str = "/clear";
}

/// Liveness value reported when the store did not answer a ping
pub const STORE_UNAVAILABLE: &str = "unavailable";

/// Body of a successful save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    pub saved: Vec<String>,
    pub store_status: String,
}

/// Body of a successful clear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearResponse {
    pub status: String,
    pub store_status: String,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_connected: bool,
    pub store_status: String,
}

/// Error body for every failing route
///
/// Only `error` is always present; the other fields depend on the failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_connected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_formats: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<Value>,
}

/// One endpoint in the capability descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_formats: Vec<String>,
}

/// Endpoint table of the capability descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    pub load: Endpoint,
    pub save: Endpoint,
    pub clear: Endpoint,
    pub health: Endpoint,
}

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub status: String,
    pub version: String,
    pub endpoints: Endpoints,
}

impl Capabilities {
    /// Descriptor for this build of the API
    pub fn current() -> Self {
        let endpoint = |method: &str, path: &str| Endpoint {
            method: method.to_string(),
            path: path.to_string(),
            body_formats: Vec::new(),
        };

        Self {
            status: "API Ready".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints: Endpoints {
                load: endpoint("GET", paths::LOAD),
                save: Endpoint {
                    body_formats: vec![
                        r#"["todo1","todo2"]"#.to_string(),
                        r#"{ "todos": ["todo1","todo2"] }"#.to_string(),
                    ],
                    ..endpoint("POST", paths::SAVE)
                },
                clear: endpoint("GET", paths::CLEAR),
                health: endpoint("GET", paths::HEALTH),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_omits_empty_fields() {
        let body = ErrorBody {
            error: "Clear failed".to_string(),
            store_connected: Some(false),
            ..ErrorBody::default()
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "Clear failed");
        assert_eq!(json["store_connected"], false);
        assert!(json.get("solution").is_none());
        assert!(json.get("received").is_none());
    }

    #[test]
    fn test_capabilities_describe_save_formats() {
        let caps = Capabilities::current();
        assert_eq!(caps.endpoints.save.method, "POST");
        assert_eq!(caps.endpoints.save.body_formats.len(), 2);

        let json = serde_json::to_value(&caps).unwrap();
        assert_eq!(json["endpoints"]["load"]["path"], "/load");
        assert!(json["endpoints"]["load"].get("body_formats").is_none());
    }
}
