//! Groq provider (OpenAI-compatible chat completions).
//!
//! Requests go to `{base_url}/chat/completions` with bearer auth. Transient
//! failures (transport errors, timeouts, 429, 5xx) are retried with
//! exponential backoff; everything else is returned immediately.

use super::{
    factory::ProviderFactory,
    secrets::{ApiCredential, CredentialSource},
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, DEFAULT_MODEL,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Environment variable name for the Groq API key.
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Default API root.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

const DEFAULT_MAX_RETRIES: usize = 2;

/// Groq chat-completions provider.
pub struct GroqProvider {
    credential: ApiCredential,
    base_url: String,
    max_retries: usize,
    #[cfg(feature = "groq")]
    client: reqwest::Client,
}

impl std::fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl GroqProvider {
    /// Create a provider from an explicit key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_credential(ApiCredential::new(
            api_key,
            CredentialSource::Programmatic,
            "Groq API key",
        ))
    }

    /// Create from the `GROQ_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(GROQ_API_KEY_ENV, "Groq API key")?;
        Ok(Self::with_credential(credential))
    }

    /// Create from JSON configuration with environment fallback.
    ///
    /// Recognized keys: `api_key`, `base_url`, `max_retries`.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let credential =
            ApiCredential::from_config_or_env(config, "api_key", GROQ_API_KEY_ENV, "Groq API key")?;

        let mut provider = Self::with_credential(credential);
        if let Some(url) = config["base_url"].as_str() {
            provider = provider.with_base_url(url);
        }
        if let Some(retries) = config["max_retries"].as_u64() {
            provider = provider.with_max_retries(retries as usize);
        }
        Ok(provider)
    }

    fn with_credential(credential: ApiCredential) -> Self {
        Self {
            credential,
            base_url: GROQ_BASE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            #[cfg(feature = "groq")]
            client: reqwest::Client::new(),
        }
    }

    /// Set custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set how many times a transient failure is retried.
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(feature = "groq")]
    async fn send_once(
        &self,
        messages: &[ChatMessage],
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        use std::time::Duration;

        let request = ChatRequest {
            model: &config.model,
            messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.credential.expose())
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::AuthError);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        body.into_completion()
    }
}

#[cfg(feature = "groq")]
#[derive(Debug, serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[cfg(any(test, feature = "groq"))]
#[derive(Debug, serde::Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[cfg(any(test, feature = "groq"))]
#[derive(Debug, serde::Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[cfg(any(test, feature = "groq"))]
#[derive(Debug, serde::Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(any(test, feature = "groq"))]
#[derive(Debug, serde::Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(feature = "groq")]
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[cfg(feature = "groq")]
#[derive(Debug, serde::Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg(any(test, feature = "groq"))]
impl ChatResponse {
    fn into_completion(self) -> Result<CompletionResponse, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError("response has no choices".to_string()))?;

        let usage = self
            .usage
            .map(|u| super::TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
            model: self.model,
            stop_reason: choice.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    #[cfg(feature = "groq")]
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        use backon::{ExponentialBuilder, Retryable};
        use std::time::Duration;

        let this = self;
        let messages = messages.as_slice();

        (|| async move { this.send_once(messages, config).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(250))
                    .with_max_times(self.max_retries),
            )
            .when(ProviderError::is_transient)
            .notify(|err, delay| {
                tracing::warn!(error = %err, delay = ?delay, "Groq request failed, retrying");
            })
            .await
    }

    #[cfg(not(feature = "groq"))]
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        Err(ProviderError::NotConfigured(
            "Groq provider requires 'groq' feature".to_string(),
        ))
    }

    async fn health_check(&self) -> bool {
        !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        "groq"
    }
}

/// Factory for creating Groq providers from configuration.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "gsk_...",                              // Optional, falls back to GROQ_API_KEY env
///   "base_url": "https://api.groq.com/openai/v1",      // Optional
///   "max_retries": 2                                   // Optional
/// }
/// ```
pub struct GroqProviderFactory;

impl ProviderFactory for GroqProviderFactory {
    fn provider_type(&self) -> &'static str {
        "groq"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(GroqProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !ApiCredential::is_available(config, "api_key", GROQ_API_KEY_ENV) {
            return Err(ProviderError::NotConfigured(format!(
                "Groq API key required: set 'api_key' in config or {} env",
                GROQ_API_KEY_ENV
            )));
        }

        if let Some(url) = config["base_url"].as_str() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ProviderError::NotConfigured(
                    "base_url must start with http:// or https://".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({
            "model": DEFAULT_MODEL,
            "base_url": GROQ_BASE_URL,
            "max_retries": DEFAULT_MAX_RETRIES
        })
    }

    fn description(&self) -> &'static str {
        "Groq chat completions (OpenAI-compatible)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = GroqProvider::new("test-key");
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.base_url(), GROQ_BASE_URL);
    }

    #[test]
    fn test_from_config_with_overrides() {
        let config = serde_json::json!({
            "api_key": "config-api-key",
            "base_url": "http://localhost:9999/v1/",
            "max_retries": 0
        });
        let provider = GroqProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url(), "http://localhost:9999/v1");
        assert_eq!(provider.max_retries, 0);
    }

    #[test]
    fn test_factory_validate_invalid_base_url() {
        let config = serde_json::json!({
            "api_key": "test-key",
            "base_url": "invalid-url"
        });
        assert!(GroqProviderFactory.validate_config(&config).is_err());
    }

    #[test]
    fn test_response_without_choices_is_parse_error() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"model":"m","choices":[]}"#).unwrap();
        assert!(matches!(
            body.into_completion(),
            Err(ProviderError::ParseError(_))
        ));
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret_key = "gsk-super-secret-key-12345";
        let provider = GroqProvider::new(secret_key);

        let debug_output = format!("{:?}", provider);
        assert!(!debug_output.contains(secret_key));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_health_check_requires_key() {
        assert!(GroqProvider::new("key").health_check().await);
        assert!(!GroqProvider::new("").health_check().await);
    }

    #[cfg(not(feature = "groq"))]
    #[tokio::test]
    async fn test_complete_without_feature() {
        let result = GroqProvider::new("key")
            .complete(vec![ChatMessage::user("hi")], &CompletionConfig::default())
            .await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[cfg(feature = "groq")]
    mod http {
        use super::*;
        use std::time::Duration;
        use wiremock::matchers::{body_partial_json, header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn provider(server: &MockServer) -> GroqProvider {
            GroqProvider::new("test-key")
                .with_base_url(format!("{}/openai/v1", server.uri()))
                .with_max_retries(0)
        }

        fn config() -> CompletionConfig {
            CompletionConfig {
                timeout: Duration::from_secs(5),
                ..Default::default()
            }
        }

        #[tokio::test]
        async fn test_complete_success() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/openai/v1/chat/completions"))
                .and(header("authorization", "Bearer test-key"))
                .and(body_partial_json(serde_json::json!({
                    "model": "openai/gpt-oss-20b",
                    "messages": [{"role": "user", "content": "Is water wet?"}]
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "model": "openai/gpt-oss-20b",
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "Yes."},
                        "finish_reason": "stop"
                    }],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 2, "total_tokens": 14}
                })))
                .expect(1)
                .mount(&server)
                .await;

            let response = provider(&server)
                .complete(vec![ChatMessage::user("Is water wet?")], &config())
                .await
                .unwrap();

            assert_eq!(response.content, "Yes.");
            assert_eq!(response.usage.total(), 14);
            assert_eq!(response.stop_reason.as_deref(), Some("stop"));
        }

        #[tokio::test]
        async fn test_rate_limited() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
                .mount(&server)
                .await;

            let err = provider(&server)
                .complete(vec![ChatMessage::user("hi")], &config())
                .await
                .unwrap_err();

            assert!(matches!(
                err,
                ProviderError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(7)
            ));
        }

        #[tokio::test]
        async fn test_api_error_message_extracted() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                    "error": {"message": "model not found", "type": "invalid_request_error"}
                })))
                .mount(&server)
                .await;

            let err = provider(&server)
                .complete(vec![ChatMessage::user("hi")], &config())
                .await
                .unwrap_err();

            match err {
                ProviderError::ApiError { status, message } => {
                    assert_eq!(status, 400);
                    assert_eq!(message, "model not found");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_unauthorized() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(401))
                .mount(&server)
                .await;

            let err = provider(&server)
                .complete(vec![ChatMessage::user("hi")], &config())
                .await
                .unwrap_err();
            assert!(matches!(err, ProviderError::AuthError));
        }

        #[tokio::test]
        async fn test_server_error_is_retried() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(503))
                .expect(3)
                .mount(&server)
                .await;

            let err = provider(&server)
                .with_max_retries(2)
                .complete(vec![ChatMessage::user("hi")], &config())
                .await
                .unwrap_err();
            assert!(matches!(err, ProviderError::ApiError { status: 503, .. }));
        }
    }
}
