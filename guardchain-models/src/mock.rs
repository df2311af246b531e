//! Mock and scripted models for testing.
//!
//! - [`MockChatModel`] / [`MockCompletionModel`]: queue of pre-configured
//!   outputs, with every request recorded for assertions
//! - [`ScriptedChatModel`] / [`ScriptedCompletionModel`]: responses
//!   computed by a caller-supplied closure
//!
//! # Example
//!
//! ```rust
//! use guardchain_models::MockChatModel;
//!
//! let model = MockChatModel::new("test")
//!     .with_text_response("{\"a\": 1}")
//!     .with_text_response("{\"a\": 2}");
//! ```

use async_trait::async_trait;
use guardchain_core::{ChatMessage, LlmOutput, ModelSettings};
use std::sync::{Arc, Mutex};

use crate::error::ModelError;
use crate::model::{ChatModel, CompletionModel};

type OutputQueue = Arc<Mutex<Vec<Result<LlmOutput, ModelError>>>>;

fn next_from(queue: &OutputQueue) -> Result<LlmOutput, ModelError> {
    let mut queue = queue.lock().unwrap();
    if queue.is_empty() {
        Ok(LlmOutput::text("mock response"))
    } else {
        queue.remove(0)
    }
}

// ============================================================================
// MockChatModel
// ============================================================================

/// A chat model with a queue of canned outputs.
///
/// Outputs are returned in order; once the queue is drained, a default
/// `"mock response"` output is returned. Every transcript received is
/// recorded.
#[derive(Debug, Clone)]
pub struct MockChatModel {
    name: String,
    outputs: OutputQueue,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockChatModel {
    /// Create a new mock chat model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outputs: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a full output.
    #[must_use]
    pub fn with_output(self, output: LlmOutput) -> Self {
        self.outputs.lock().unwrap().push(Ok(output));
        self
    }

    /// Queue a single-generation text output.
    #[must_use]
    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        let name = self.name.clone();
        self.with_output(LlmOutput::text(text).with_model_name(name))
    }

    /// Queue an error.
    #[must_use]
    pub fn with_error(self, error: ModelError) -> Self {
        self.outputs.lock().unwrap().push(Err(error));
        self
    }

    /// Transcripts received so far.
    pub fn recorded_requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// Forget all recorded transcripts.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        "mock"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        _settings: &ModelSettings,
    ) -> Result<LlmOutput, ModelError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        next_from(&self.outputs)
    }
}

// ============================================================================
// MockCompletionModel
// ============================================================================

/// A completion model with a queue of canned outputs.
///
/// The completion twin of [`MockChatModel`]; records received prompts.
#[derive(Debug, Clone)]
pub struct MockCompletionModel {
    name: String,
    outputs: OutputQueue,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockCompletionModel {
    /// Create a new mock completion model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outputs: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a full output.
    #[must_use]
    pub fn with_output(self, output: LlmOutput) -> Self {
        self.outputs.lock().unwrap().push(Ok(output));
        self
    }

    /// Queue a single-generation text output.
    #[must_use]
    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        let name = self.name.clone();
        self.with_output(LlmOutput::text(text).with_model_name(name))
    }

    /// Queue an error.
    #[must_use]
    pub fn with_error(self, error: ModelError) -> Self {
        self.outputs.lock().unwrap().push(Err(error));
        self
    }

    /// Prompts received so far.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for MockCompletionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        prompt: &str,
        _settings: &ModelSettings,
    ) -> Result<LlmOutput, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        next_from(&self.outputs)
    }
}

// ============================================================================
// Scripted models
// ============================================================================

/// Callback signature for [`ScriptedChatModel`].
pub type ChatScript = Box<dyn Fn(&[ChatMessage], &ModelSettings) -> LlmOutput + Send + Sync>;

/// Callback signature for [`ScriptedCompletionModel`].
pub type CompletionScript = Box<dyn Fn(&str, &ModelSettings) -> LlmOutput + Send + Sync>;

/// A chat model whose responses are computed by a closure.
///
/// More flexible than [`MockChatModel`]: the closure sees the full
/// transcript and settings, so responses can depend on conversation
/// state.
#[derive(Clone)]
pub struct ScriptedChatModel {
    name: String,
    script: Arc<ChatScript>,
}

impl std::fmt::Debug for ScriptedChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedChatModel")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ScriptedChatModel {
    /// Create a scripted chat model.
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&[ChatMessage], &ModelSettings) -> LlmOutput + Send + Sync + 'static,
    {
        Self {
            name: "scripted-chat".to_string(),
            script: Arc::new(Box::new(script)),
        }
    }

    /// Create a model that echoes the last user message.
    pub fn echo() -> Self {
        Self::new(|messages, _| {
            let last = messages
                .iter()
                .rev()
                .find(|m| m.role == guardchain_core::ChatRole::User)
                .map(|m| m.content.as_str())
                .unwrap_or("no user message");
            LlmOutput::text(format!("Echo: {last}"))
        })
    }

    /// Set a custom model name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        settings: &ModelSettings,
    ) -> Result<LlmOutput, ModelError> {
        Ok((self.script)(messages, settings))
    }
}

/// A completion model whose responses are computed by a closure.
#[derive(Clone)]
pub struct ScriptedCompletionModel {
    name: String,
    script: Arc<CompletionScript>,
}

impl std::fmt::Debug for ScriptedCompletionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedCompletionModel")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ScriptedCompletionModel {
    /// Create a scripted completion model.
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str, &ModelSettings) -> LlmOutput + Send + Sync + 'static,
    {
        Self {
            name: "scripted-completion".to_string(),
            script: Arc::new(Box::new(script)),
        }
    }

    /// Set a custom model name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl CompletionModel for ScriptedCompletionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        prompt: &str,
        settings: &ModelSettings,
    ) -> Result<LlmOutput, ModelError> {
        Ok((self.script)(prompt, settings))
    }
}
