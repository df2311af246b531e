//! OpenAI legacy completions client.
//!
//! The `/completions` endpoint takes a single prompt string instead of
//! a message transcript. Still served by OpenAI-compatible gateways and
//! local inference servers for base (non-chat) models.

use async_trait::async_trait;
use guardchain_core::{FinishReason, Generation, LlmOutput, ModelSettings};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::types::{CompletionRequest, CompletionResponse};
use super::{read_response, API_KEY_ENV, DEFAULT_BASE_URL};
use crate::config::ClientConfig;
use crate::error::ModelError;
use crate::model::CompletionModel;

/// Client for an OpenAI-compatible `/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompletionModel {
    model_name: String,
    client: Client,
    api_key: String,
    base_url: String,
    organization: Option<String>,
    default_timeout: Duration,
}

impl OpenAiCompletionModel {
    /// Create a new completion model client.
    pub fn new(model_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            default_timeout: Duration::from_secs(120),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model_name: impl Into<String>) -> Result<Self, ModelError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            ModelError::Configuration(format!("{API_KEY_ENV} environment variable not set"))
        })?;
        Ok(Self::new(model_name, api_key))
    }

    /// Create from a [`ClientConfig`].
    pub fn from_config(
        model_name: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, ModelError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ModelError::Configuration("API key missing".to_string()))?;
        let mut model = Self::new(model_name, api_key);
        if let Some(url) = &config.base_url {
            model.base_url = url.as_str().trim_end_matches('/').to_string();
        }
        model.organization = config.organization.clone();
        model.default_timeout = config.timeout_duration();
        Ok(model)
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the organization ID.
    #[must_use]
    pub fn with_organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Set a custom HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set the default timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    fn convert_response(&self, response: CompletionResponse) -> Result<LlmOutput, ModelError> {
        if response.choices.is_empty() {
            return Err(ModelError::InvalidResponse(
                "response contained no choices".to_string(),
            ));
        }

        let generations = response
            .choices
            .into_iter()
            .map(|choice| {
                let mut generation = Generation::new(choice.text).with_index(choice.index);
                if let Some(reason) = choice.finish_reason.as_deref() {
                    generation = generation.with_finish_reason(FinishReason::from_provider(reason));
                }
                generation
            })
            .collect();

        let mut output = LlmOutput::with_generations(generations)
            .with_model_name(response.model.unwrap_or_else(|| self.model_name.clone()));
        if let Some(usage) = response.usage {
            output = output.with_usage(usage.into());
        }
        Ok(output)
    }
}

#[async_trait]
impl CompletionModel for OpenAiCompletionModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn provider(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        prompt: &str,
        settings: &ModelSettings,
    ) -> Result<LlmOutput, ModelError> {
        let body = CompletionRequest {
            model: self.model_name.clone(),
            prompt: prompt.to_string(),
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens: settings.max_tokens,
            stop: settings.stop.clone(),
            seed: settings.seed,
        };
        let timeout = settings.timeout.unwrap_or(self.default_timeout);
        debug!(
            model = %self.model_name,
            prompt_len = prompt.len(),
            "sending completion request"
        );

        let mut request = self
            .client
            .post(format!("{}/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&body);
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout(timeout)
            } else {
                e.into()
            }
        })?;
        let parsed: CompletionResponse = read_response(response).await?;
        self.convert_response(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_maps_text_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo-instruct",
                "prompt": "Emit {\"done\": true}"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-3.5-turbo-instruct",
                "choices": [
                    {"index": 0, "text": "{\"done\": true}", "finish_reason": "stop"},
                    {"index": 1, "text": "{\"done\": false}", "finish_reason": "length"}
                ],
                "usage": {"prompt_tokens": 9, "completion_tokens": 7, "total_tokens": 16}
            })))
            .mount(&server)
            .await;

        let model = OpenAiCompletionModel::new("gpt-3.5-turbo-instruct", "sk-test")
            .with_base_url(server.uri());
        let output = model
            .complete("Emit {\"done\": true}", &ModelSettings::new())
            .await
            .unwrap();

        assert_eq!(output.generations.len(), 2);
        assert_eq!(output.first_text(), Some("{\"done\": true}"));
        assert_eq!(
            output.generations[1].finish_reason,
            Some(FinishReason::Length)
        );
    }

    #[tokio::test]
    async fn test_complete_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "3")
                    .set_body_string("rate limited"),
            )
            .mount(&server)
            .await;

        let model =
            OpenAiCompletionModel::new("gpt-3.5-turbo-instruct", "sk").with_base_url(server.uri());
        let err = model
            .complete("hi", &ModelSettings::new())
            .await
            .unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_complete_empty_choices_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let model =
            OpenAiCompletionModel::new("gpt-3.5-turbo-instruct", "sk").with_base_url(server.uri());
        let err = model
            .complete("hi", &ModelSettings::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }
}
