//! OpenAI-compatible chat completions client.
//!
//! Gemini, OpenAI and OpenRouter all accept the same request shape on
//! `{base_url}/chat/completions`, so one client covers every [`Provider`].
//!
//! [`Provider`]: crate::config::Provider

use std::time::Duration;

use async_trait::async_trait;
use coach_models::TokenUsage;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::ModelConfig;
use crate::error::{AgentError, Result};

/// Anything that can answer a chat-completion request.
///
/// Implemented by [`OpenAiCompatClient`]; tests substitute scripted backends.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Send the conversation and return the model's completion.
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse>;
}

/// HTTP client for OpenAI-compatible chat completions.
#[derive(Clone)]
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    config: ModelConfig,
    api_key: String,
    url: String,
}

impl std::fmt::Debug for OpenAiCompatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatClient")
            .field("model", &self.config.model)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatClient {
    /// Create a client with an explicit API key.
    pub fn new(config: ModelConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Configuration(format!("failed to build HTTP client: {}", e)))?;
        let url = config.completions_url();

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
            url,
        })
    }

    /// Create a client, taking the API key from the config or the
    /// provider's environment variable (e.g. `GEMINI_API_KEY`).
    pub fn from_env(config: ModelConfig) -> Result<Self> {
        let key_env = config.provider.api_key_env();
        let api_key = match config.api_key.clone() {
            Some(key) if !key.is_empty() => key,
            _ => std::env::var(key_env)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    AgentError::Configuration(format!(
                        "Missing {} environment variable; check your .env file",
                        key_env
                    ))
                })?,
        };
        Self::new(config, api_key)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    async fn send_once(&self, request: &ChatRequest) -> std::result::Result<ChatResponse, Attempt> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Attempt::Retryable(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = format!("API error {}: {}", status, text);
            return if status.as_u16() == 429 || status.is_server_error() {
                Err(Attempt::Retryable(message))
            } else {
                Err(Attempt::Fatal(AgentError::ModelInvocation(message)))
            };
        }

        response.json::<ChatResponse>().await.map_err(|e| {
            Attempt::Fatal(AgentError::ResponseParse(format!(
                "Failed to parse response: {}",
                e
            )))
        })
    }
}

/// Outcome of a single failed HTTP attempt.
enum Attempt {
    Retryable(String),
    Fatal(AgentError),
}

#[async_trait]
impl ChatBackend for OpenAiCompatClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        trace!("Sending chat request: {:?}", request);

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(response) => {
                    debug!(
                        model = %self.config.model,
                        tokens = response.usage.as_ref().map_or(0, |u| u.total_tokens),
                        "Chat response received"
                    );
                    return Ok(response);
                }
                Err(Attempt::Fatal(err)) => return Err(err),
                Err(Attempt::Retryable(message)) if attempt < self.config.max_retries => {
                    let delay = self.config.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16));
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay,
                        error = %message,
                        "Retrying chat request"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(Attempt::Retryable(message)) => {
                    return Err(AgentError::ModelInvocation(message));
                }
            }
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in the chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: String,

    /// Text content of the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Participant name, used to tell group-chat speakers apart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            name: None,
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    /// Create a user message attributed to a named participant.
    pub fn user_named(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::user(content)
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Unique identifier for this completion.
    #[serde(default)]
    pub id: Option<String>,

    /// Completion choices.
    pub choices: Vec<ChatChoice>,

    /// Token usage information.
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Build a single-choice text response. Used by scripted backends.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            id: None,
            choices: vec![ChatChoice {
                index: 0,
                message: ResponseMessage {
                    role: "assistant".into(),
                    content: Some(content.into()),
                },
                finish_reason: Some("stop".into()),
            }],
            usage: None,
        }
    }

    /// Attach usage numbers.
    pub fn with_usage(mut self, prompt_tokens: u64, completion_tokens: u64) -> Self {
        self.usage = Some(ChatUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        });
        self
    }

    /// Get the first choice's message.
    pub fn message(&self) -> Option<&ResponseMessage> {
        self.choices.first().map(|c| &c.message)
    }

    /// Text of the first choice; empty when the model returned no content.
    pub fn content(&self) -> String {
        self.message()
            .and_then(|m| m.content.clone())
            .unwrap_or_default()
    }

    /// Usage converted to the shared token type.
    pub fn token_usage(&self) -> Option<TokenUsage> {
        self.usage
            .as_ref()
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
    }
}

/// A choice in the completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// Index of this choice.
    #[serde(default)]
    pub index: u32,

    /// The message for this choice.
    pub message: ResponseMessage,

    /// Finish reason (stop, length, etc.).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message in a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Role (always "assistant" for responses).
    pub role: String,

    /// Text content of the response.
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,

    /// Tokens in the completion.
    #[serde(default)]
    pub completion_tokens: u64,

    /// Total tokens used.
    #[serde(default)]
    pub total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn test_chat_message_constructors() {
        let system = ChatMessage::system("You are helpful.");
        assert_eq!(system.role, "system");
        assert_eq!(system.content, Some("You are helpful.".to_string()));

        let named = ChatMessage::user_named("Summary ready", "data_agent");
        assert_eq!(named.role, "user");
        assert_eq!(named.name.as_deref(), Some("data_agent"));

        let assistant = ChatMessage::assistant("Hi there!");
        assert_eq!(assistant.role, "assistant");
    }

    #[test]
    fn test_request_serialization_skips_unset_fields() {
        let request = ChatRequest {
            model: "gemini-2.0-flash".to_string(),
            messages: vec![ChatMessage::system("s"), ChatMessage::user("u")],
            max_tokens: None,
            temperature: Some(0.2),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gemini-2.0-flash");
        assert!(value.get("max_tokens").is_none());
        assert!(value["messages"][0].get("name").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "gen-123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "今天辛苦了。"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.id.as_deref(), Some("gen-123"));
        assert_eq!(response.content(), "今天辛苦了。");
        assert_eq!(response.token_usage(), Some(TokenUsage::new(10, 5)));
    }

    #[test]
    fn test_response_without_content_or_usage() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content(), "");
        assert!(response.token_usage().is_none());
    }

    #[test]
    fn test_from_env_uses_explicit_key() {
        let config = ModelConfig::default().with_api_key("explicit");
        let client = OpenAiCompatClient::from_env(config).unwrap();
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_from_env_missing_key() {
        std::env::remove_var("OPENROUTER_API_KEY");
        let config = ModelConfig::default().with_provider(crate::config::Provider::OpenRouter);
        let err = OpenAiCompatClient::from_env(config).unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[derive(Clone)]
    struct Server {
        hits: Arc<AtomicUsize>,
        failures: usize,
        status: StatusCode,
    }

    async fn completions(
        State(server): State<Server>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let hit = server.hits.fetch_add(1, Ordering::SeqCst);
        if hit < server.failures {
            return (server.status, Json(json!({"error": "try later"})));
        }
        let last = body["messages"]
            .as_array()
            .and_then(|m| m.last())
            .and_then(|m| m["content"].as_str())
            .unwrap_or_default()
            .to_string();
        (
            StatusCode::OK,
            Json(json!({
                "id": "mock",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": format!("echo: {}", last)}}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5}
            })),
        )
    }

    async fn spawn_server(failures: usize, status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(Server {
                hits: Arc::clone(&hits),
                failures,
                status,
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1/", addr), hits)
    }

    fn client_for(base_url: &str, max_retries: u32) -> OpenAiCompatClient {
        let config = ModelConfig::default()
            .with_base_url(base_url)
            .with_retries(max_retries, 1);
        OpenAiCompatClient::new(config, "test-key").unwrap()
    }

    #[tokio::test]
    async fn test_chat_round_trip_against_local_server() {
        let (base_url, hits) = spawn_server(0, StatusCode::OK).await;
        let client = client_for(&base_url, 0);

        let response = client
            .chat(vec![ChatMessage::user("hello")])
            .await
            .unwrap();

        assert_eq!(response.content(), "echo: hello");
        assert_eq!(response.token_usage(), Some(TokenUsage::new(3, 2)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chat_retries_rate_limits() {
        let (base_url, hits) = spawn_server(2, StatusCode::TOO_MANY_REQUESTS).await;
        let client = client_for(&base_url, 2);

        let response = client.chat(vec![ChatMessage::user("again")]).await.unwrap();

        assert_eq!(response.content(), "echo: again");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_chat_gives_up_after_max_retries() {
        let (base_url, hits) = spawn_server(10, StatusCode::SERVICE_UNAVAILABLE).await;
        let client = client_for(&base_url, 1);

        let err = client.chat(vec![ChatMessage::user("x")]).await.unwrap_err();

        assert!(matches!(err, AgentError::ModelInvocation(_)));
        assert!(err.to_string().contains("503"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let (base_url, hits) = spawn_server(10, StatusCode::UNAUTHORIZED).await;
        let client = client_for(&base_url, 3);

        let err = client.chat(vec![ChatMessage::user("x")]).await.unwrap_err();

        assert!(err.to_string().contains("401"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
