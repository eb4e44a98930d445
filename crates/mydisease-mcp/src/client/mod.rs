//! MyDisease.info API client.
//!
//! Provides the async HTTP adapter used by every tool:
//! - One pooled `reqwest` client per server process
//! - Per-request timeout and one requests-per-second budget shared by
//!   every clone of the client
//! - Status classification (2xx body, 404 not found, 4xx caller error,
//!   5xx/timeout transient)
//!
//! Retries are not performed here; the batch dispatcher owns the retry policy.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::query::{Method, UpstreamRequest};

/// MyDisease.info API client.
#[derive(Clone)]
pub struct MyDiseaseClient {
    /// Pooled HTTP client.
    client: Client,

    /// API base URL, without trailing slash.
    base_url: String,

    /// Per-request timeout, reported on timeouts.
    request_timeout: Duration,

    /// Shared rate limiter; `None` when rate limiting is disabled.
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl MyDiseaseClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "application/json".parse().expect("valid accept header"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("mydisease-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
            limiter: NonZeroU32::new(config.rate_limit)
                .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate)))),
        })
    }

    /// API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get one disease document by id.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` for unknown ids, or any transport error.
    pub async fn get_disease(&self, disease_id: &str, fields: Option<&str>) -> ClientResult<Value> {
        let mut params = Vec::new();
        if let Some(fields) = fields {
            params.push(("fields".to_string(), fields.to_string()));
        }
        let path = format!("disease/{}", url_path_segment(disease_id));
        self.get(&path, &params).await
    }

    /// Run a Lucene query against `GET /query`.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn query(&self, params: &[(String, String)]) -> ClientResult<Value> {
        self.get("query", params).await
    }

    /// Get API build metadata.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn metadata(&self) -> ClientResult<Value> {
        self.get("metadata", &[]).await
    }

    /// Get the field catalogue.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn metadata_fields(&self) -> ClientResult<Value> {
        self.get("metadata/fields", &[]).await
    }

    /// Execute a translated upstream request.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn execute(&self, request: &UpstreamRequest) -> ClientResult<Value> {
        match (request.method, &request.body) {
            (Method::Post, Some(body)) => self.post(&request.path, &request.params, body).await,
            (Method::Post, None) => {
                self.post(&request.path, &request.params, &Value::Object(serde_json::Map::new()))
                    .await
            }
            (Method::Get, _) => self.get(&request.path, &request.params).await,
        }
    }

    /// Make a GET request.
    async fn get(&self, path: &str, params: &[(String, String)]) -> ClientResult<Value> {
        self.pause().await;

        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.read_body(response).await
    }

    /// Make a POST request with a JSON body.
    async fn post(&self, path: &str, params: &[(String, String)], body: &Value) -> ClientResult<Value> {
        self.pause().await;

        let url = self.url(path);
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .query(params)
            .json(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.read_body(response).await
    }

    /// Wait for the shared per-second budget.
    async fn pause(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.request_timeout)
        } else {
            ClientError::Http(error)
        }
    }

    /// Classify the status and decode the JSON body.
    async fn read_body(&self, response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await.map_err(|e| self.send_error(e))?;
            return serde_json::from_slice(&bytes).map_err(ClientError::from);
        }

        let code = status.as_u16();
        let text = response.text().await.unwrap_or_default();

        match code {
            404 => Err(ClientError::not_found(text)),
            400..=499 => Err(ClientError::bad_request(code, text)),
            500..=599 => Err(ClientError::server(code, text)),
            _ => Err(ClientError::UnexpectedStatus { status: code, message: text }),
        }
    }
}

/// Percent-encode characters that would break a single path segment.
fn url_path_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b':' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

impl std::fmt::Debug for MyDiseaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MyDiseaseClient")
            .field("base_url", &self.base_url)
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_path_segment() {
        assert_eq!(url_path_segment("MONDO:0007739"), "MONDO:0007739");
        assert_eq!(url_path_segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_url_joins_base() {
        let config = Config::for_testing("http://localhost:1234");
        let client = MyDiseaseClient::new(&config).unwrap();
        assert_eq!(client.url("/query"), "http://localhost:1234/v1/query");
        assert_eq!(client.base_url(), "http://localhost:1234/v1");
    }

    #[tokio::test]
    async fn test_clones_share_one_budget() {
        let mut config = Config::for_testing("http://localhost:1234");
        config.rate_limit = 2;
        let client = MyDiseaseClient::new(&config).unwrap();
        let clone = client.clone();

        let started = tokio::time::Instant::now();
        client.pause().await;
        clone.pause().await;
        // Budget of two is spent; the third call waits for the next slot.
        client.pause().await;
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_zero_rate_never_waits() {
        let client = MyDiseaseClient::new(&Config::for_testing("http://localhost:1234")).unwrap();
        assert!(client.limiter.is_none());

        let started = tokio::time::Instant::now();
        for _ in 0..50 {
            client.pause().await;
        }
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
