//! OpenAI-compatible model clients.
//!
//! [`OpenAiChatModel`] speaks `/chat/completions`; [`OpenAiCompletionModel`]
//! speaks the legacy `/completions` endpoint. Both work against any
//! OpenAI-compatible server via `with_base_url`.

mod chat;
mod completion;
pub mod types;

pub use chat::OpenAiChatModel;
pub use completion::OpenAiCompletionModel;

use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ModelError;
use types::ApiErrorBody;

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Turn an HTTP response into a parsed body or a classified error.
pub(crate) async fn read_response<T: DeserializeOwned>(
    response: Response,
) -> Result<T, ModelError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(|e| {
            ModelError::InvalidResponse(format!("malformed response body: {e}"))
        });
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();

    Err(classify_failure(status, &body, retry_after))
}

fn classify_failure(
    status: StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> ModelError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ModelError::Authentication(api_message(body).unwrap_or_else(|| body.to_string()))
        }
        StatusCode::TOO_MANY_REQUESTS => ModelError::RateLimited { retry_after },
        _ => match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(envelope) => ModelError::Api {
                message: envelope.error.message,
                code: envelope.error.code,
            },
            Err(_) => ModelError::Http {
                status: status.as_u16(),
                body: body.to_string(),
            },
        },
    }
}

fn api_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_unauthorized_with_envelope() {
        let err = classify_failure(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "Incorrect API key"}}"#,
            None,
        );
        match err {
            ModelError::Authentication(msg) => assert_eq!(msg, "Incorrect API key"),
            other => panic!("expected Authentication, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_rate_limit_keeps_retry_after() {
        let err = classify_failure(
            StatusCode::TOO_MANY_REQUESTS,
            "slow down",
            Some(Duration::from_secs(5)),
        );
        assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_classify_api_error_envelope() {
        let err = classify_failure(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "unknown model", "code": "model_not_found"}}"#,
            None,
        );
        match err {
            ModelError::Api { message, code } => {
                assert_eq!(message, "unknown model");
                assert_eq!(code.as_deref(), Some("model_not_found"));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_opaque_failure() {
        let err = classify_failure(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>", None);
        match err {
            ModelError::Http { status, .. } => assert_eq!(status, 502),
            other => panic!("expected Http, got {other:?}"),
        }
        assert!(err.is_retryable());
    }
}
