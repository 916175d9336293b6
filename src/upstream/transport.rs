//! HTTP transport seam
//!
//! Defines the HttpTransport trait for issuing GET requests and
//! ReqwestTransport as the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};

use crate::error::{GatewayError, Result};

use super::query::QueryParams;

/// A fully built upstream request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    /// Endpoint path relative to the API base, e.g. "ticker/price"
    pub endpoint: String,
    /// Absolute URL without query string
    pub url: String,
    /// Normalized query parameters
    pub query: QueryParams,
    /// Deadline for the whole exchange
    pub timeout: Duration,
}

impl UpstreamRequest {
    /// Look up a query value by key
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_param(&self, key: &str) -> bool {
        self.param(key).is_some()
    }

    /// Query keys in outbound order
    pub fn param_names(&self) -> Vec<&str> {
        self.query.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Absolute URL with the encoded query string appended
    pub fn to_url(&self) -> Result<Url> {
        let url = if self.query.is_empty() {
            Url::parse(&self.url)
        } else {
            Url::parse_with_params(&self.url, &self.query)
        };
        url.map_err(|e| GatewayError::Config(format!("Invalid upstream URL '{}': {}", self.url, e)))
    }
}

/// Status and body as received from the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues one GET per call; implementations must not retain per-call state
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: &UpstreamRequest) -> Result<RawResponse>;
}

/// reqwest-backed transport sharing one connection pool across calls
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport identifying itself with the given user agent
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &UpstreamRequest) -> Result<RawResponse> {
        let url = request.to_url()?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| classify(e, request.timeout))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(e, request.timeout))?;

        debug!("{} -> {} ({} bytes)", request.endpoint, status, body.len());
        Ok(RawResponse { status, body })
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(timeout)
    } else if err.is_decode() {
        GatewayError::Decode(err.to_string())
    } else {
        GatewayError::Network(err.to_string())
    }
}
