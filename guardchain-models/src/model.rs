//! Core model traits.
//!
//! Chat and completion endpoints are distinct trait surfaces here
//! because guarded chains are typed against one or the other: a chat
//! model consumes a message transcript, a completion model a single
//! prompt string. Both return the same [`LlmOutput`].

use async_trait::async_trait;
use guardchain_core::{ChatMessage, LlmOutput, ModelSettings};
use std::sync::Arc;

use crate::error::ModelError;

/// A model invoked with a chat transcript.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model name (e.g. `gpt-4o-mini`).
    fn name(&self) -> &str;

    /// The provider this model belongs to (e.g. `openai`).
    fn provider(&self) -> &str;

    /// Full `provider:name` identifier.
    fn identifier(&self) -> String {
        format!("{}:{}", self.provider(), self.name())
    }

    /// Send a chat transcript and await the model's output.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        settings: &ModelSettings,
    ) -> Result<LlmOutput, ModelError>;
}

/// A model invoked with a single prompt string.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// The model name.
    fn name(&self) -> &str;

    /// The provider this model belongs to.
    fn provider(&self) -> &str;

    /// Full `provider:name` identifier.
    fn identifier(&self) -> String {
        format!("{}:{}", self.provider(), self.name())
    }

    /// Send a prompt and await the model's output.
    async fn complete(
        &self,
        prompt: &str,
        settings: &ModelSettings,
    ) -> Result<LlmOutput, ModelError>;
}

/// Boxed chat model for dynamic dispatch.
pub type BoxedChatModel = Arc<dyn ChatModel>;

/// Boxed completion model for dynamic dispatch.
pub type BoxedCompletionModel = Arc<dyn CompletionModel>;
