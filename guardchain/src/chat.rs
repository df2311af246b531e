//! The guarded chain for chat models.

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::debug;

use guardchain_core::{ChatMessage, ModelSettings};
use guardchain_models::{BoxedChatModel, ChatModel};
use guardchain_output::{Guard, OutputSpec};

use crate::chain::{Chain, GuardedChain, DEFAULT_OUTPUT_KEY};
use crate::error::ChainError;
use crate::template::PromptTemplate;

/// A schema-guarded chain over a chat model.
///
/// Construction compiles the guard prompt from the task query and the
/// output spec. A call formats the human-message template with the
/// inputs, sends it together with the guard's system instructions, and
/// returns the first generation's text under the output key.
///
/// # Example
///
/// ```rust,ignore
/// use guardchain::{Chain, ChatGuardChain};
/// use guardchain_models::OpenAiChatModel;
/// use indexmap::IndexMap;
///
/// let model = OpenAiChatModel::from_env("gpt-4o-mini")?;
/// let chain = ChatGuardChain::new(
///     model,
///     "Where does {{person}} live?",
///     "<string name=\"city\"/>",
/// )?;
///
/// let mut inputs = IndexMap::new();
/// inputs.insert("person".to_string(), "Marie Curie".to_string());
/// let answer = chain.run(&inputs).await?;
/// ```
#[derive(Clone)]
pub struct ChatGuardChain {
    model: BoxedChatModel,
    guard: Guard,
    prompt: PromptTemplate,
    settings: ModelSettings,
    output_key: String,
}

impl std::fmt::Debug for ChatGuardChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatGuardChain")
            .field("model", &self.model.identifier())
            .field("output_key", &self.output_key)
            .finish_non_exhaustive()
    }
}

impl ChatGuardChain {
    /// Build a chain from a model, a task query, and an output spec.
    ///
    /// # Errors
    ///
    /// Fails when the guard rejects the spec or query (see
    /// [`Guard::for_chat`]).
    pub fn new(
        model: impl ChatModel + 'static,
        query: impl Into<String>,
        spec: impl Into<OutputSpec>,
    ) -> Result<Self, ChainError> {
        Self::from_boxed(std::sync::Arc::new(model), query, spec)
    }

    /// Build a chain from an already-boxed model.
    pub fn from_boxed(
        model: BoxedChatModel,
        query: impl Into<String>,
        spec: impl Into<OutputSpec>,
    ) -> Result<Self, ChainError> {
        let guard = Guard::for_chat(spec, query)?;
        let prompt = PromptTemplate::new(guard.base_prompt());
        Ok(Self {
            model,
            guard,
            prompt,
            settings: ModelSettings::default(),
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
        })
    }

    /// Set the model settings used for every call.
    #[must_use]
    pub fn with_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the output key.
    #[must_use]
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    /// Set the maximum number of corrective re-asks on the guard.
    #[must_use]
    pub fn with_max_reasks(mut self, max_reasks: u32) -> Self {
        self.guard = self.guard.with_max_reasks(max_reasks);
        self
    }

    /// The compiled human-message template.
    #[must_use]
    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    fn transcript(&self, human: String) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(instructions) = self.guard.instructions() {
            messages.push(ChatMessage::system(instructions));
        }
        messages.push(ChatMessage::user(human));
        messages
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ChainError> {
        debug!(
            model = %self.model.identifier(),
            messages = messages.len(),
            "running guarded chat chain"
        );
        let output = self.model.chat(messages, &self.settings).await?;
        let text = output.first_text().ok_or(ChainError::EmptyResponse)?;
        Ok(text.to_string())
    }
}

#[async_trait]
impl Chain for ChatGuardChain {
    fn input_keys(&self) -> Vec<String> {
        self.prompt.input_variables().to_vec()
    }

    fn output_keys(&self) -> Vec<String> {
        vec![self.output_key.clone()]
    }

    async fn call(
        &self,
        inputs: &IndexMap<String, String>,
    ) -> Result<IndexMap<String, String>, ChainError> {
        let human = self.prompt.format(inputs)?;
        let text = self.send(&self.transcript(human)).await?;

        let mut outputs = IndexMap::new();
        outputs.insert(self.output_key.clone(), text);
        Ok(outputs)
    }
}

#[async_trait]
impl GuardedChain for ChatGuardChain {
    fn guard(&self) -> &Guard {
        &self.guard
    }

    async fn regenerate(
        &self,
        inputs: &IndexMap<String, String>,
        previous: &str,
        correction: &str,
    ) -> Result<String, ChainError> {
        let human = self.prompt.format(inputs)?;
        let mut messages = self.transcript(human);
        messages.push(ChatMessage::assistant(previous));
        messages.push(ChatMessage::user(correction));
        self.send(&messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardchain_core::ChatRole;
    use guardchain_models::{MockChatModel, ModelError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const QUERY: &str = "Extract the patient from these notes:\n\n{{doctors_notes}}";

    fn spec() -> serde_json::Value {
        json!({
            "type": "object",
            "required": ["age"],
            "properties": {"age": {"type": "integer"}}
        })
    }

    fn inputs() -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        map.insert(
            "doctors_notes".to_string(),
            "49 y/o with chronic rash".to_string(),
        );
        map
    }

    #[tokio::test]
    async fn test_returns_first_generation_text() {
        let model = MockChatModel::new("test").with_text_response("{\"age\": 49}");
        let chain = ChatGuardChain::new(model, QUERY, spec()).unwrap();

        let outputs = chain.call(&inputs()).await.unwrap();
        assert_eq!(outputs.get("text").map(String::as_str), Some("{\"age\": 49}"));
    }

    #[tokio::test]
    async fn test_transcript_shape() {
        let model = MockChatModel::new("test").with_text_response("{}");
        let chain = ChatGuardChain::new(model.clone(), QUERY, spec()).unwrap();
        chain.call(&inputs()).await.unwrap();

        let recorded = chain_requests(&model);
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].role, ChatRole::System);
        assert_eq!(
            recorded[0].content,
            chain.guard().instructions().unwrap()
        );
        assert_eq!(recorded[1].role, ChatRole::User);
        assert!(recorded[1].content.contains("49 y/o with chronic rash"));
        assert!(!recorded[1].content.contains("{{doctors_notes}}"));
    }

    fn chain_requests(model: &MockChatModel) -> Vec<ChatMessage> {
        let mut requests = model.recorded_requests();
        assert_eq!(requests.len(), 1);
        requests.remove(0)
    }

    #[test]
    fn test_input_and_output_keys() {
        let model = MockChatModel::new("test");
        let chain = ChatGuardChain::new(model, QUERY, spec())
            .unwrap()
            .with_output_key("answer");

        assert_eq!(chain.input_keys(), vec!["doctors_notes".to_string()]);
        assert_eq!(chain.output_keys(), vec!["answer".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_input_fails() {
        let model = MockChatModel::new("test");
        let chain = ChatGuardChain::new(model, QUERY, spec()).unwrap();

        let err = chain.call(&IndexMap::new()).await.unwrap_err();
        assert!(matches!(err, ChainError::Template(_)));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = MockChatModel::new("test").with_error(ModelError::api("overloaded"));
        let chain = ChatGuardChain::new(model, QUERY, spec()).unwrap();

        let err = chain.call(&inputs()).await.unwrap_err();
        assert!(matches!(err, ChainError::Model(_)));
    }

    #[tokio::test]
    async fn test_empty_output_is_error() {
        let model =
            MockChatModel::new("test").with_output(guardchain_core::LlmOutput::new());
        let chain = ChatGuardChain::new(model, QUERY, spec()).unwrap();

        let err = chain.call(&inputs()).await.unwrap_err();
        assert!(matches!(err, ChainError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_regenerate_appends_transcript() {
        let model = MockChatModel::new("test").with_text_response("{\"age\": 49}");
        let chain = ChatGuardChain::new(model.clone(), QUERY, spec()).unwrap();

        chain
            .regenerate(&inputs(), "{\"age\": \"old\"}", "Fix the age field.")
            .await
            .unwrap();

        let recorded = chain_requests(&model);
        assert_eq!(recorded.len(), 4);
        assert_eq!(recorded[2].role, ChatRole::Assistant);
        assert_eq!(recorded[2].content, "{\"age\": \"old\"}");
        assert_eq!(recorded[3].role, ChatRole::User);
        assert_eq!(recorded[3].content, "Fix the age field.");
    }

    #[test]
    fn test_run_sync_from_blocking_context() {
        let model = MockChatModel::new("test").with_text_response("{\"age\": 3}");
        let chain = ChatGuardChain::new(model, QUERY, spec()).unwrap();
        let answer = chain.run_sync(&inputs()).unwrap();
        assert_eq!(answer, "{\"age\": 3}");
    }
}
