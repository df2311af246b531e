//! Model-related error types.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by model clients.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Non-success HTTP response that carried no parseable API error.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// API-level error reported by the provider.
    #[error("API error: {message}")]
    Api {
        /// Error message.
        message: String,
        /// Provider error code, when present.
        code: Option<String>,
    },

    /// Request timeout.
    #[error("request timeout after {0:?}")]
    Timeout(Duration),

    /// Rate limited by the API.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested retry delay.
        retry_after: Option<Duration>,
    },

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Response did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Connection-level failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Client configuration problem.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModelError {
    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: None,
        }
    }

    /// Create an API error with a code.
    pub fn api_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Check if this error is worth retrying at the transport level.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RateLimited { .. } | Self::Connection(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The retry-after hint, if the provider sent one.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured timeout here.
            Self::Timeout(Duration::ZERO)
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Other(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ModelError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(ModelError::RateLimited { retry_after: None }.is_retryable());
        assert!(ModelError::Http {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!ModelError::Authentication("bad key".into()).is_retryable());
        assert!(!ModelError::Http {
            status: 400,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = ModelError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
        assert_eq!(ModelError::api("nope").retry_after(), None);
    }

    #[test]
    fn test_api_constructors() {
        let err = ModelError::api_with_code("model overloaded", "overloaded");
        assert!(err.to_string().contains("model overloaded"));
    }
}
