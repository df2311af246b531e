//! Message types for model interactions.
//!
//! This module defines the types that are sent TO a chat model
//! ([`ChatMessage`]) and the types every model call returns
//! ([`LlmOutput`] holding one or more [`Generation`]s). Completion
//! models take a plain prompt string, so only the response side applies
//! to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::usage::TokenUsage;

/// The author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions that frame the whole conversation.
    System,
    /// A human turn.
    User,
    /// A model turn.
    Assistant,
}

impl ChatRole {
    /// Wire-format name for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored this turn.
    pub role: ChatRole,
    /// The text content.
    pub content: String,
}

impl ChatMessage {
    /// Create a message with an explicit role.
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop or stop sequence hit.
    Stop,
    /// Token limit reached.
    Length,
    /// Provider content filter intervened.
    ContentFilter,
    /// Provider-specific reason not covered above.
    Other(String),
}

impl FinishReason {
    /// Parse a provider's finish-reason string.
    ///
    /// Unknown values are preserved in [`FinishReason::Other`] rather
    /// than dropped.
    #[must_use]
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "stop" | "stop_sequence" | "end_turn" => Self::Stop,
            "length" | "max_tokens" => Self::Length,
            "content_filter" => Self::ContentFilter,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One candidate completion produced by a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    /// The generated text.
    pub text: String,
    /// Position among this call's candidates.
    #[serde(default)]
    pub index: u32,
    /// Why generation stopped, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

impl Generation {
    /// Create a generation from text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            index: 0,
            finish_reason: None,
        }
    }

    /// Set the candidate index.
    #[must_use]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Set the finish reason.
    #[must_use]
    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }
}

/// Everything a single model call returns.
///
/// Providers may return several candidate generations; callers that only
/// care about the primary one use [`LlmOutput::first_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmOutput {
    /// Candidate generations, in provider order.
    pub generations: Vec<Generation>,
    /// Name of the model that produced this output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Token usage for this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// When this output was received.
    pub created: DateTime<Utc>,
}

impl LlmOutput {
    /// Create an empty output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            model_name: None,
            usage: None,
            created: Utc::now(),
        }
    }

    /// Create an output with the given generations.
    #[must_use]
    pub fn with_generations(generations: Vec<Generation>) -> Self {
        Self {
            generations,
            ..Self::new()
        }
    }

    /// Create an output holding a single text generation.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_generations(vec![Generation::new(content)])
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    /// Set the usage.
    #[must_use]
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Text of the first generation, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.generations.first().map(|g| g.text.as_str())
    }

    /// Iterate over all generation texts.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.generations.iter().map(|g| g.text.as_str())
    }

    /// Check whether this output carries no generations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }
}

impl Default for LlmOutput {
    fn default() -> Self {
        Self::new()
    }
}
