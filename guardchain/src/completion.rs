//! The guarded chain for completion models.

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::debug;

use guardchain_core::ModelSettings;
use guardchain_models::{BoxedCompletionModel, CompletionModel};
use guardchain_output::{Guard, OutputSpec};

use crate::chain::{Chain, GuardedChain, DEFAULT_OUTPUT_KEY};
use crate::error::ChainError;
use crate::template::PromptTemplate;

/// A schema-guarded chain over a completion model.
///
/// The completion twin of [`crate::ChatGuardChain`]: the whole contract
/// (query, schema block, JSON-only suffix) travels in a single prompt
/// string, since completion endpoints have no system-message channel.
///
/// # Example
///
/// ```rust,ignore
/// use guardchain::{Chain, CompletionGuardChain};
/// use guardchain_models::OpenAiCompletionModel;
/// use indexmap::IndexMap;
///
/// let model = OpenAiCompletionModel::from_env("gpt-3.5-turbo-instruct")?;
/// let chain = CompletionGuardChain::new(
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
pub struct CompletionGuardChain {
    model: BoxedCompletionModel,
    guard: Guard,
    prompt: PromptTemplate,
    settings: ModelSettings,
    output_key: String,
}

impl std::fmt::Debug for CompletionGuardChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionGuardChain")
            .field("model", &self.model.identifier())
            .field("output_key", &self.output_key)
            .finish_non_exhaustive()
    }
}

impl CompletionGuardChain {
    /// Build a chain from a model, a task query, and an output spec.
    ///
    /// # Errors
    ///
    /// Fails when the guard rejects the spec or query (see
    /// [`Guard::for_completion`]).
    pub fn new(
        model: impl CompletionModel + 'static,
        query: impl Into<String>,
        spec: impl Into<OutputSpec>,
    ) -> Result<Self, ChainError> {
        Self::from_boxed(std::sync::Arc::new(model), query, spec)
    }

    /// Build a chain from an already-boxed model.
    pub fn from_boxed(
        model: BoxedCompletionModel,
        query: impl Into<String>,
        spec: impl Into<OutputSpec>,
    ) -> Result<Self, ChainError> {
        let guard = Guard::for_completion(spec, query)?;
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

    /// The compiled prompt template.
    #[must_use]
    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    async fn send(&self, prompt: &str) -> Result<String, ChainError> {
        debug!(
            model = %self.model.identifier(),
            prompt_len = prompt.len(),
            "running guarded completion chain"
        );
        let output = self.model.complete(prompt, &self.settings).await?;
        let text = output.first_text().ok_or(ChainError::EmptyResponse)?;
        Ok(text.to_string())
    }
}

#[async_trait]
impl Chain for CompletionGuardChain {
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
        let prompt = self.prompt.format(inputs)?;
        let text = self.send(&prompt).await?;

        let mut outputs = IndexMap::new();
        outputs.insert(self.output_key.clone(), text);
        Ok(outputs)
    }
}

#[async_trait]
impl GuardedChain for CompletionGuardChain {
    fn guard(&self) -> &Guard {
        &self.guard
    }

    async fn regenerate(
        &self,
        inputs: &IndexMap<String, String>,
        previous: &str,
        correction: &str,
    ) -> Result<String, ChainError> {
        let prompt = self.prompt.format(inputs)?;
        let followup = format!("{prompt}\n\n{previous}\n\n{correction}");
        self.send(&followup).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardchain_models::MockCompletionModel;
    use pretty_assertions::assert_eq;

    const QUERY: &str = "Name the capital of {{country}}.";
    const SPEC: &str = "<string name=\"capital\" description=\"Capital city\"/>";

    fn inputs() -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        map.insert("country".to_string(), "France".to_string());
        map
    }

    #[tokio::test]
    async fn test_returns_first_generation_text() {
        let model =
            MockCompletionModel::new("test").with_text_response("{\"capital\": \"Paris\"}");
        let chain = CompletionGuardChain::new(model, QUERY, SPEC).unwrap();

        let answer = chain.run(&inputs()).await.unwrap();
        assert_eq!(answer, "{\"capital\": \"Paris\"}");
    }

    #[tokio::test]
    async fn test_prompt_carries_query_schema_and_suffix() {
        let model = MockCompletionModel::new("test").with_text_response("{}");
        let chain = CompletionGuardChain::new(model.clone(), QUERY, SPEC).unwrap();
        chain.call(&inputs()).await.unwrap();

        let prompts = model.recorded_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Name the capital of France."));
        assert!(prompts[0].contains(SPEC));
        assert!(prompts[0].contains("Return ONLY a single valid JSON"));
        assert!(!prompts[0].contains("{{country}}"));
    }

    #[test]
    fn test_input_keys_from_compiled_prompt() {
        let model = MockCompletionModel::new("test");
        let chain = CompletionGuardChain::new(model, QUERY, SPEC).unwrap();
        assert_eq!(chain.input_keys(), vec!["country".to_string()]);
        assert_eq!(chain.output_keys(), vec!["text".to_string()]);
    }

    #[tokio::test]
    async fn test_regenerate_appends_previous_and_correction() {
        let model = MockCompletionModel::new("test").with_text_response("{\"capital\": \"Paris\"}");
        let chain = CompletionGuardChain::new(model.clone(), QUERY, SPEC).unwrap();

        chain
            .regenerate(&inputs(), "not json", "Answer with JSON only.")
            .await
            .unwrap();

        let prompts = model.recorded_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("not json\n\nAnswer with JSON only."));
    }

    #[test]
    fn test_run_sync_from_blocking_context() {
        let model = MockCompletionModel::new("test").with_text_response("{\"capital\": \"Rome\"}");
        let chain = CompletionGuardChain::new(model, QUERY, SPEC).unwrap();
        assert_eq!(chain.run_sync(&inputs()).unwrap(), "{\"capital\": \"Rome\"}");
    }
}
