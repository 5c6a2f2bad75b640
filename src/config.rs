use log::debug;
use reqwest::Url;

use crate::error::ApiError;
use crate::http::RetryPolicy;

/// User agent sent with every request.
pub const USER_AGENT: &str = "sheetbridge";

/// Immutable client configuration: where to send requests, who is asking,
/// and how to retry.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub script_url: Url,
    pub email: String,
    pub retry: RetryPolicy,
    /// Log request and response details at info level.
    pub debug: bool,
}

impl ClientConfig {
    pub fn new(script_url: &str, email: &str) -> Result<Self, ApiError> {
        let script_url = Url::parse(script_url.trim()).map_err(|e| {
            ApiError::Configuration(format!("invalid endpoint URL '{}': {}", script_url, e))
        })?;

        let email = email.trim();
        if email.is_empty() {
            return Err(ApiError::Configuration(
                "user email must not be empty".to_string(),
            ));
        }

        debug!("Using endpoint {} as {}", script_url, email);

        Ok(Self {
            script_url,
            email: email.to_string(),
            retry: RetryPolicy::default(),
            debug: false,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builds the reqwest client used by the default transport.
    pub fn build_http_client(&self) -> Result<reqwest::Client, ApiError> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {}", e)))
    }
}
