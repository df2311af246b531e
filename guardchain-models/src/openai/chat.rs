//! OpenAI chat completions client.

use async_trait::async_trait;
use guardchain_core::{ChatMessage, FinishReason, Generation, LlmOutput, ModelSettings};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::types::{ChatCompletionRequest, ChatCompletionResponse, WireChatMessage};
use super::{read_response, API_KEY_ENV, DEFAULT_BASE_URL};
use crate::config::ClientConfig;
use crate::error::ModelError;
use crate::model::ChatModel;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    model_name: String,
    client: Client,
    api_key: String,
    base_url: String,
    organization: Option<String>,
    default_timeout: Duration,
}

impl OpenAiChatModel {
    /// Create a new chat model client.
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

    fn build_request(
        &self,
        messages: &[ChatMessage],
        settings: &ModelSettings,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model_name.clone(),
            messages: messages
                .iter()
                .map(|m| WireChatMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens: settings.max_tokens,
            stop: settings.stop.clone(),
            seed: settings.seed,
        }
    }

    fn convert_response(&self, response: ChatCompletionResponse) -> Result<LlmOutput, ModelError> {
        if response.choices.is_empty() {
            return Err(ModelError::InvalidResponse(
                "response contained no choices".to_string(),
            ));
        }

        let generations = response
            .choices
            .into_iter()
            .map(|choice| {
                let mut generation =
                    Generation::new(choice.message.content.unwrap_or_default())
                        .with_index(choice.index);
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
impl ChatModel for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn provider(&self) -> &str {
        "openai"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        settings: &ModelSettings,
    ) -> Result<LlmOutput, ModelError> {
        let body = self.build_request(messages, settings);
        let timeout = settings.timeout.unwrap_or(self.default_timeout);
        debug!(
            model = %self.model_name,
            messages = messages.len(),
            "sending chat completion request"
        );

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
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
        let parsed: ChatCompletionResponse = read_response(response).await?;
        self.convert_response(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardchain_core::ChatRole;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model_for(server: &MockServer) -> OpenAiChatModel {
        OpenAiChatModel::new("gpt-4o-mini", "sk-test").with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_chat_maps_choices_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o-mini-2024-07-18",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "{\"ok\": true}"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 21, "completion_tokens": 6, "total_tokens": 27}
            })))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let output = model
            .chat(
                &[ChatMessage::user("Say ok as JSON")],
                &ModelSettings::new(),
            )
            .await
            .unwrap();

        assert_eq!(output.first_text(), Some("{\"ok\": true}"));
        assert_eq!(
            output.generations[0].finish_reason,
            Some(FinishReason::Stop)
        );
        assert_eq!(output.model_name.as_deref(), Some("gpt-4o-mini-2024-07-18"));
        assert_eq!(output.usage.unwrap().total_tokens, Some(27));
    }

    #[tokio::test]
    async fn test_chat_sends_roles_and_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0,
                "messages": [
                    {"role": "system", "content": "JSON only."},
                    {"role": "user", "content": "Go."}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "{}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = model_for(&server);
        let messages = [ChatMessage::system("JSON only."), ChatMessage::user("Go.")];
        model
            .chat(&messages, &ModelSettings::new().temperature(0.0))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_chat_empty_choices_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let err = model
            .chat(&[ChatMessage::user("hi")], &ModelSettings::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided"}
            })))
            .mount(&server)
            .await;

        let model = model_for(&server);
        let err = model
            .chat(&[ChatMessage::user("hi")], &ModelSettings::new())
            .await
            .unwrap_err();
        match err {
            ModelError::Authentication(msg) => {
                assert!(msg.contains("Incorrect API key"));
            }
            other => panic!("expected Authentication, got {other:?}"),
        }
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig::with_api_key("sk-abc")
            .base_url(url::Url::parse("https://example.test/v1/").unwrap())
            .organization("org-9");
        let model = OpenAiChatModel::from_config("gpt-4o", config).unwrap();
        assert_eq!(model.base_url, "https://example.test/v1");
        assert_eq!(model.organization.as_deref(), Some("org-9"));
    }

    #[test]
    fn test_request_roles() {
        let model = OpenAiChatModel::new("gpt-4o", "sk");
        let request = model.build_request(
            &[
                ChatMessage::new(ChatRole::System, "s"),
                ChatMessage::new(ChatRole::Assistant, "a"),
            ],
            &ModelSettings::new(),
        );
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "assistant");
    }
}
