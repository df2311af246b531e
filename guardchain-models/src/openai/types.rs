//! OpenAI-compatible wire types.
//!
//! Request/response bodies for the `/chat/completions` and legacy
//! `/completions` endpoints. Only the fields this workspace sends or
//! reads are modeled; unknown response fields are ignored.

use guardchain_core::TokenUsage;
use serde::{Deserialize, Serialize};

// ============================================================================
// Chat endpoint
// ============================================================================

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model to use.
    pub model: String,
    /// Messages in the conversation.
    pub messages: Vec<WireChatMessage>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// A chat message on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireChatMessage {
    /// Role of the message author.
    pub role: String,
    /// Message content.
    pub content: String,
}

/// Chat completion response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,
    /// Generated choices.
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Token usage.
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

/// One chat completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// Position among the returned choices.
    #[serde(default)]
    pub index: u32,
    /// The generated message.
    pub message: ChatChoiceMessage,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The message inside a chat choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    /// Message content; may be absent for refusals.
    #[serde(default)]
    pub content: Option<String>,
}

// ============================================================================
// Legacy completions endpoint
// ============================================================================

/// Text completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Model to use.
    pub model: String,
    /// The prompt.
    pub prompt: String,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Text completion response body.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,
    /// Generated choices.
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
    /// Token usage.
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

/// One text completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    /// Position among the returned choices.
    #[serde(default)]
    pub index: u32,
    /// The generated text.
    pub text: String,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

// ============================================================================
// Shared
// ============================================================================

/// Token usage on the wire.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireUsage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    /// Tokens in the completion.
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    /// Total tokens.
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

impl From<WireUsage> for TokenUsage {
    fn from(wire: WireUsage) -> Self {
        TokenUsage {
            prompt_tokens: wire.prompt_tokens,
            completion_tokens: wire.completion_tokens,
            total_tokens: wire.total_tokens,
        }
    }
}

/// Error envelope returned by OpenAI-compatible APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// The error payload.
    pub error: ApiErrorDetail,
}

/// Error detail inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code.
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_skips_unset_options() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![WireChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            temperature: None,
            top_p: None,
            max_tokens: Some(64),
            stop: None,
            seed: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"max_tokens\":64"));
        assert!(!json.contains("temperature"));
        assert!(!json.contains("stop"));
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.content.as_deref(), Some("hello"));
        assert!(response.usage.is_none());
    }

    #[test]
    fn test_usage_conversion() {
        let wire = WireUsage {
            prompt_tokens: Some(10),
            completion_tokens: Some(4),
            total_tokens: Some(14),
        };
        let usage: TokenUsage = wire.into();
        assert_eq!(usage.total_tokens, Some(14));
    }

    #[test]
    fn test_error_body_parse() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error": {"message": "Invalid API key", "code": "invalid_api_key"}}"#,
        )
        .unwrap();
        assert_eq!(body.error.code.as_deref(), Some("invalid_api_key"));
    }
}
