//! Request execution pipeline: build the request, send it, classify the
//! outcome, and retry transport failures with exponential backoff.

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::Value;

use crate::api::types::{ApiResult, ConnectionStatus, QueryParams};
use crate::config::ClientConfig;
use crate::error::{ApiError, DEFAULT_FAILURE_MESSAGE};
use crate::http::{
    HttpTransport, Scheduler, TokioScheduler, Transport, TransportOutcome, TransportRequest,
};

/// Action used by the connectivity probe. Read-only on the remote side.
pub const PROBE_ACTION: &str = "getItems";

/// Query keys owned by the client. Caller-supplied values for them are dropped.
const ACTION_KEY: &str = "action";
const EMAIL_KEY: &str = "email";

/// Runs remote actions: builds each request, sends it, and retries transport failures.
pub struct RequestExecutor<T: Transport = HttpTransport, S: Scheduler = TokioScheduler> {
    config: ClientConfig,
    transport: T,
    scheduler: S,
}

impl RequestExecutor {
    /// Creates an executor that talks HTTP through reqwest and sleeps on the
    /// tokio timer.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = config.build_http_client()?;
        Ok(Self::with_parts(
            config,
            HttpTransport::new(client),
            TokioScheduler,
        ))
    }
}

impl<T: Transport, S: Scheduler> RequestExecutor<T, S> {
    pub fn with_parts(config: ClientConfig, transport: T, scheduler: S) -> Self {
        Self {
            config,
            transport,
            scheduler,
        }
    }

    /// Builds the outgoing request for an action.
    ///
    /// `action` and `email` are always present in the query string and take
    /// precedence over caller-supplied keys of the same name. A payload that
    /// is absent or JSON `null` produces a GET without body; anything else a
    /// POST with the payload as JSON body.
    pub fn build_request(
        &self,
        action: &str,
        payload: Option<&Value>,
        query: &QueryParams,
    ) -> Result<TransportRequest, ApiError> {
        let action = action.trim();
        if action.is_empty() {
            return Err(ApiError::Configuration(
                "action must not be empty".to_string(),
            ));
        }

        let mut url = self.config.script_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(ACTION_KEY, action);
            pairs.append_pair(EMAIL_KEY, &self.config.email);
            for (key, value) in query {
                if key == ACTION_KEY || key == EMAIL_KEY {
                    debug!("Ignoring caller query parameter '{}'", key);
                    continue;
                }
                pairs.append_pair(key, value);
            }
        }

        let (method, body) = match payload.filter(|p| !p.is_null()) {
            Some(payload) => {
                let body = serde_json::to_string(payload).map_err(|e| {
                    ApiError::Configuration(format!("payload is not serializable: {}", e))
                })?;
                (Method::POST, Some(body))
            }
            None => (Method::GET, None),
        };

        Ok(TransportRequest { method, url, body })
    }

    /// Runs an action against the remote endpoint.
    ///
    /// Transport failures are retried up to the configured attempt limit;
    /// an explicit `success: false` from the remote is returned immediately.
    #[tracing::instrument(skip(self, payload, query))]
    pub async fn execute(
        &self,
        action: &str,
        payload: Option<Value>,
        query: &QueryParams,
    ) -> Result<ApiResult, ApiError> {
        let request = self.build_request(action, payload.as_ref(), query)?;
        self.trace(format_args!("{} {}", request.method, request.url));
        if let Some(body) = &request.body {
            self.trace(format_args!("Request body: {}", body));
        }

        let policy = self.config.retry;
        let mut last_error = None;

        let max_attempts = policy.max_attempts();

        for attempt in 1..=max_attempts {
            match self.attempt(&request).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_retryable() {
                        debug!("{}: non-retryable error: {}", action, e);
                        return Err(e);
                    }

                    if attempt < max_attempts {
                        let delay = policy.delay_for(attempt);
                        warn!(
                            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                            action,
                            attempt,
                            max_attempts,
                            e,
                            delay.as_millis()
                        );
                        self.scheduler.sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ApiError::transport(format!(
                "{}: failed after {} attempts",
                action, max_attempts
            ))
        }))
    }

    /// Probes the endpoint once, without retry, and reports the outcome as
    /// data instead of an error.
    #[tracing::instrument(skip(self))]
    pub async fn test_connection(&self) -> ConnectionStatus {
        let request = match self.build_request(PROBE_ACTION, None, &QueryParams::new()) {
            Ok(request) => request,
            Err(e) => return failed_probe(&e, None),
        };

        let outcome = match self.transport.send(&request).await {
            Ok(outcome) => outcome,
            Err(e) => return failed_probe(&ApiError::transport(format!("{:#}", e)), None),
        };

        let status = outcome.status;
        match classify(outcome) {
            Ok(result) => ConnectionStatus {
                success: true,
                message: result
                    .message()
                    .unwrap_or_else(|| "Connection successful".to_string()),
                status: Some(status),
            },
            Err(e) => failed_probe(&e, Some(status)),
        }
    }

    async fn attempt(&self, request: &TransportRequest) -> Result<ApiResult, ApiError> {
        let outcome = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::transport(format!("{:#}", e)))?;

        match &outcome.body {
            Ok(body) => self.trace(format_args!("Response (HTTP {}): {}", outcome.status, body)),
            Err(detail) => self.trace(format_args!("Response (HTTP {}): {}", outcome.status, detail)),
        }

        classify(outcome)
    }

    fn trace(&self, line: std::fmt::Arguments<'_>) {
        if self.config.debug {
            info!("{}", line);
        } else {
            debug!("{}", line);
        }
    }
}

fn failed_probe(error: &ApiError, status: Option<u16>) -> ConnectionStatus {
    ConnectionStatus {
        success: false,
        message: error.to_string(),
        status: status.or_else(|| error.status()),
    }
}

/// Maps a raw transport outcome onto the client's result or error taxonomy.
pub fn classify(outcome: TransportOutcome) -> Result<ApiResult, ApiError> {
    if !outcome.is_success() {
        return Err(ApiError::http_status(outcome.status));
    }

    let body = outcome.body.map_err(|detail| ApiError::transport(detail))?;

    match body {
        Value::Object(object) => {
            let result = ApiResult::from_object(object);
            if result.is_success() {
                return Ok(result);
            }
            let message = result
                .message()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            Err(ApiError::Application(message))
        }
        // A bare value has no success flag.
        _ => Err(ApiError::Application(DEFAULT_FAILURE_MESSAGE.to_string())),
    }
}
