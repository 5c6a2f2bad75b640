//! Classified failures returned by the request pipeline.

/// Generic detail used when the remote rejects a request without a message.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

/// Errors surfaced to callers of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be built (empty action, bad endpoint, bad input).
    /// Raised before any network activity.
    Configuration(String),
    /// Network failure, non-2xx status, or a body that is not JSON.
    /// Retried until the attempt limit is reached.
    Transport {
        status: Option<u16>,
        detail: String,
    },
    /// The remote answered with `success: false`. Never retried.
    Application(String),
}

impl ApiError {
    pub fn transport(detail: impl Into<String>) -> Self {
        ApiError::Transport {
            status: None,
            detail: detail.into(),
        }
    }

    pub fn http_status(status: u16) -> Self {
        ApiError::Transport {
            status: Some(status),
            detail: format!("HTTP {} error", status),
        }
    }

    /// Only transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }

    /// HTTP status attached to a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Configuration(msg) => {
                write!(f, "Invalid request: {}", msg)
            }
            ApiError::Transport {
                status: Some(status),
                detail,
            } => {
                write!(f, "Transport error (HTTP {}): {}", status, detail)
            }
            ApiError::Transport { status: None, detail } => {
                write!(f, "Transport error: {}", detail)
            }
            ApiError::Application(msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Configuration("action must not be empty".to_string());
        assert!(err.to_string().contains("Invalid request"));
        assert!(err.to_string().contains("action must not be empty"));

        let err = ApiError::http_status(503);
        assert!(err.to_string().contains("HTTP 503"));

        let err = ApiError::transport("connection reset");
        assert_eq!(err.to_string(), "Transport error: connection reset");

        // Application errors carry the remote message verbatim
        let err = ApiError::Application("Duplicate booking".to_string());
        assert_eq!(err.to_string(), "Duplicate booking");
    }

    #[test]
    fn test_is_retryable() {
        assert!(ApiError::http_status(500).is_retryable());
        assert!(ApiError::transport("dns lookup failed").is_retryable());
        assert!(!ApiError::Application("nope".to_string()).is_retryable());
        assert!(!ApiError::Configuration("empty".to_string()).is_retryable());
    }

    #[test]
    fn test_status() {
        assert_eq!(ApiError::http_status(404).status(), Some(404));
        assert_eq!(ApiError::transport("timeout").status(), None);
        assert_eq!(ApiError::Application("x".to_string()).status(), None);
    }
}
