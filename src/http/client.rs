//! HTTP transport: one request in, one status and decoded body out.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, Url};
use serde_json::Value;

/// A fully built request ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    /// JSON-encoded body. Present only for POST requests.
    pub body: Option<String>,
}

impl TransportRequest {
    /// Returns the value of a query parameter, if present.
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// What came back from a single round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportOutcome {
    pub status: u16,
    /// Decoded JSON body, or a description of why it could not be decoded.
    pub body: std::result::Result<Value, String>,
}

impl TransportOutcome {
    pub fn new(status: u16, body: std::result::Result<Value, String>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a request and reports the raw outcome.
/// An `Err` means the request never produced an HTTP response.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &TransportRequest) -> Result<TransportOutcome>;
}

/// Transport backed by a reqwest Client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a new transport wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method))]
    async fn send(&self, request: &TransportRequest) -> Result<TransportOutcome> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.context("Failed to send request")?;
        let status = response.status().as_u16();

        let body = match response.text().await {
            Ok(text) => serde_json::from_str::<Value>(&text)
                .map_err(|e| format!("Failed to parse JSON response: {}", e)),
            Err(e) => Err(format!("Failed to read response body: {}", e)),
        };

        debug!("{} {} -> HTTP {}", request.method, request.url, status);

        Ok(TransportOutcome::new(status, body))
    }
}
