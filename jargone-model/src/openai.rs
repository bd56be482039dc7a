//! OpenAI chat completions provider.
//!
//! This module is only available when the `openai` feature is enabled. It is
//! built on `async-openai`, so any OpenAI-compatible server (vLLM, Ollama, a
//! local proxy) works through `base_url`.

use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig as AsyncOpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use tracing::{debug, error};

use crate::error::{ModelError, Result};
use crate::provider::GenerativeProvider;

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// The default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

const PROVIDER: &str = "OpenAI";

/// Connection and model settings for [`OpenAIChatProvider`].
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Model name, e.g. `gpt-4o-mini`.
    pub model: String,
    /// API base URL without a trailing slash.
    pub base_url: String,
    /// Upper bound on a single completion, including the client's own
    /// rate-limit backoff.
    pub timeout: Duration,
    /// Sampling temperature; the API default when `None`.
    pub temperature: Option<f32>,
}

impl OpenAIConfig {
    /// Settings for the public OpenAI API with the given key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_API_BASE.to_string(),
            timeout: Duration::from_secs(60),
            temperature: None,
        }
    }

    /// Settings for an OpenAI-compatible server.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::new(api_key, model).with_base_url(base_url)
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A [`GenerativeProvider`] backed by the OpenAI chat completions API.
///
/// # Example
///
/// ```rust,ignore
/// use jargone_model::openai::{OpenAIChatProvider, OpenAIConfig};
///
/// let model = OpenAIChatProvider::new(OpenAIConfig::new(
///     std::env::var("OPENAI_API_KEY")?,
///     "gpt-4o-mini",
/// ))?;
/// ```
pub struct OpenAIChatProvider {
    client: Client<AsyncOpenAIConfig>,
    config: OpenAIConfig,
}

impl OpenAIChatProvider {
    /// Create a provider from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] if the API key or model is empty.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::Config("OpenAI API key must not be empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(ModelError::Config("model name must not be empty".into()));
        }
        let openai_config =
            AsyncOpenAIConfig::new().with_api_key(&config.api_key).with_api_base(&config.base_url);
        Ok(Self { client: Client::with_config(openai_config), config })
    }

    /// Create a provider for `model` using the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::Config("OPENAI_API_KEY environment variable not set".into()))?;
        Self::new(OpenAIConfig::new(api_key, model))
    }

    /// The active settings.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    #[allow(deprecated)]
    fn build_request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<CreateChatCompletionRequest> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(map_openai_error)?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(user_prompt)
            .build()
            .map_err(map_openai_error)?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![system.into(), user.into()];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.config.model).messages(messages).max_tokens(max_tokens);
        if let Some(temperature) = self.config.temperature {
            builder.temperature(temperature);
        }
        builder.build().map_err(map_openai_error)
    }
}

/// Map an `async-openai` error onto [`ModelError`].
///
/// API errors carry no HTTP status, so one is inferred from the error type
/// and code: rate limits become 429, server errors 500, authentication
/// failures 401 and everything else 400.
fn map_openai_error(err: OpenAIError) -> ModelError {
    match err {
        OpenAIError::Reqwest(e) if e.is_timeout() => {
            ModelError::Timeout { provider: PROVIDER.into(), message: e.to_string() }
        }
        OpenAIError::Reqwest(e) => match e.status() {
            Some(status) => ModelError::Api {
                provider: PROVIDER.into(),
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => ModelError::Request { provider: PROVIDER.into(), message: e.to_string() },
        },
        OpenAIError::ApiError(api) => ModelError::Api {
            provider: PROVIDER.into(),
            status: inferred_status(&api),
            message: api.message,
        },
        OpenAIError::JSONDeserialize(e) => ModelError::InvalidResponse {
            provider: PROVIDER.into(),
            message: format!("failed to parse response: {e}"),
        },
        OpenAIError::InvalidArgument(message) => ModelError::Config(message),
        other => ModelError::Request { provider: PROVIDER.into(), message: other.to_string() },
    }
}

fn inferred_status(api: &ApiError) -> u16 {
    let kind = api.r#type.as_deref().unwrap_or_default();
    let code = api.code.as_deref().unwrap_or_default();
    match (kind, code) {
        ("insufficient_quota", _) => 400,
        (_, "rate_limit_exceeded") | ("rate_limit_error", _) => 429,
        ("authentication_error", _) | (_, "invalid_api_key") => 401,
        ("server_error", _) => 500,
        // Server errors arrive from the client as bare text without type or code.
        ("", "") if api.param.is_none() => 500,
        _ => 400,
    }
}

#[async_trait]
impl GenerativeProvider for OpenAIChatProvider {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.config.model, max_tokens, "chat completion");

        let request = self.build_request(system_prompt, user_prompt, max_tokens)?;
        let response =
            tokio::time::timeout(self.config.timeout, self.client.chat().create(request))
                .await
                .map_err(|_| {
                    error!(provider = PROVIDER, timeout = ?self.config.timeout, "request timed out");
                    ModelError::Timeout {
                        provider: PROVIDER.into(),
                        message: format!("no response within {:?}", self.config.timeout),
                    }
                })?
                .map_err(map_openai_error)
                .inspect_err(|e| error!(provider = PROVIDER, error = %e, "API error"))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ModelError::InvalidResponse {
                provider: PROVIDER.into(),
                message: "response contained no completion".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(kind: Option<&str>, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: "boom".into(),
            r#type: kind.map(Into::into),
            param: None,
            code: code.map(Into::into),
        })
    }

    #[test]
    fn rejects_empty_api_key() {
        let err = OpenAIChatProvider::new(OpenAIConfig::new("  ", DEFAULT_CHAT_MODEL)).err();
        assert!(matches!(err, Some(ModelError::Config(_))));
    }

    #[test]
    fn compatible_trims_trailing_slash() {
        let config = OpenAIConfig::compatible("key", "http://localhost:8000/v1/", "llama");
        assert_eq!(config.base_url, "http://localhost:8000/v1");
        assert_eq!(config.model, "llama");
    }

    #[test]
    fn request_carries_system_then_user() {
        let provider =
            OpenAIChatProvider::new(OpenAIConfig::new("key", DEFAULT_CHAT_MODEL)).unwrap();
        let request = provider.build_request("sys", "usr", 800).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], DEFAULT_CHAT_MODEL);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "sys");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["max_tokens"], 800);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn temperature_is_sent_when_set() {
        let provider = OpenAIChatProvider::new(
            OpenAIConfig::new("key", DEFAULT_CHAT_MODEL).with_temperature(0.5),
        )
        .unwrap();
        let json = serde_json::to_value(provider.build_request("s", "u", 10).unwrap()).unwrap();
        assert_eq!(json["temperature"], 0.5);
    }

    #[test]
    fn api_errors_map_to_retryable_statuses() {
        let rate = map_openai_error(api_error(Some("requests"), Some("rate_limit_exceeded")));
        assert!(matches!(rate, ModelError::Api { status: 429, .. }));
        assert!(rate.is_retryable());

        let server = map_openai_error(api_error(None, None));
        assert!(matches!(server, ModelError::Api { status: 500, .. }));
        assert!(server.is_retryable());

        let quota = map_openai_error(api_error(Some("insufficient_quota"), None));
        assert!(!quota.is_retryable());

        let auth = map_openai_error(api_error(None, Some("invalid_api_key")));
        assert!(matches!(auth, ModelError::Api { status: 401, .. }));
        assert!(!auth.is_retryable());
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let held = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let provider = OpenAIChatProvider::new(
            OpenAIConfig::compatible("key", format!("http://{addr}/v1"), "llama")
                .with_timeout(Duration::from_millis(200)),
        )
        .unwrap();
        let err = provider.complete("sys", "usr", 16).await.unwrap_err();
        assert!(err.is_timeout(), "unexpected error: {err}");
        held.abort();
    }

    #[test]
    fn decode_and_argument_errors_map_to_their_kinds() {
        let decode = serde_json::from_str::<u8>("nope").unwrap_err();
        assert!(matches!(
            map_openai_error(OpenAIError::JSONDeserialize(decode)),
            ModelError::InvalidResponse { .. }
        ));
        assert!(matches!(
            map_openai_error(OpenAIError::InvalidArgument("bad".into())),
            ModelError::Config(_)
        ));
    }
}
