//! HTTP sync client
//!
//! Issues the load/save/clear calls against the snaplist API. There is no
//! retry and no cancellation; a timeout only applies when one is configured.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::{ClientError, ClientResult};
use crate::api::{paths, Capabilities, ClearResponse, ErrorBody, HealthResponse, SaveResponse};
use crate::config::Config;

/// Client for the snaplist HTTP API
#[derive(Debug, Clone)]
pub struct SyncClient {
    base_url: String,
    http: reqwest::Client,
}

impl SyncClient {
    /// Create a client without a request timeout
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client with an optional per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> ClientResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Build)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Create a client from the configured server URL and timeout
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::with_timeout(&config.server_url, config.request_timeout())
    }

    /// Base URL requests go to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the stored snapshot
    pub async fn load(&self) -> ClientResult<Vec<String>> {
        let url = self.url(paths::LOAD);
        debug!("GET {}", url);
        let response = self.send(self.http.get(&url), &url).await?;
        read_json(response, &url).await
    }

    /// Replace the stored snapshot with `items`
    pub async fn save(&self, items: &[String]) -> ClientResult<SaveResponse> {
        let url = self.url(paths::SAVE);
        debug!("POST {} ({} item(s))", url, items.len());
        let response = self.send(self.http.post(&url).json(items), &url).await?;
        read_json(response, &url).await
    }

    /// Reset the stored snapshot to empty
    pub async fn clear(&self) -> ClientResult<ClearResponse> {
        let url = self.url(paths::CLEAR);
        debug!("GET {}", url);
        let response = self.send(self.http.get(&url), &url).await?;
        read_json(response, &url).await
    }

    /// Fetch the API capability descriptor
    pub async fn capabilities(&self) -> ClientResult<Capabilities> {
        let url = self.url(paths::ROOT);
        let response = self.send(self.http.get(&url), &url).await?;
        read_json(response, &url).await
    }

    /// Fetch store health
    ///
    /// A degraded server answers 503 with the same body; both are returned
    /// as `Ok` so callers can show the store status.
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let url = self.url(paths::HEALTH);
        let response = self.send(self.http.get(&url), &url).await?;
        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return decode_body(response, &url).await;
        }
        read_json(response, &url).await
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> ClientResult<Response> {
        request.send().await.map_err(|source| {
            warn!("Request to {} failed: {}", url, source);
            ClientError::Request {
                url: url.to_string(),
                source,
            }
        })
    }
}

/// Decode a success body, or turn an error status into a `ClientError`
async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return decode_body(response, url).await;
    }

    let body = response.json::<ErrorBody>().await.unwrap_or_else(|_| ErrorBody {
        error: status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        ..ErrorBody::default()
    });

    warn!("{} answered {}: {}", url, status, body.error);
    if status.is_client_error() {
        Err(ClientError::Rejected {
            status: status.as_u16(),
            body,
        })
    } else {
        Err(ClientError::Server {
            status: status.as_u16(),
            body,
        })
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response, url: &str) -> ClientResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::UnexpectedResponse {
            url: url.to_string(),
            details: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = SyncClient::new("http://localhost:3001/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001");
        assert_eq!(client.url(paths::LOAD), "http://localhost:3001/load");
    }

    #[test]
    fn test_from_config_uses_server_url() {
        let config = Config {
            server_url: "http://10.0.0.78:3001".to_string(),
            request_timeout_secs: Some(5),
            ..Config::default()
        };
        let client = SyncClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://10.0.0.78:3001");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client = SyncClient::new("http://127.0.0.1:1").unwrap();
        let err = client.load().await.unwrap_err();
        assert!(err.is_network());
    }
}
