//! Model client — the single point of entry for all chat-completion calls.
//!
//! No other module may talk to the provider endpoint directly; every LLM
//! interaction goes through `ModelClient`, which owns the retry policy.
//! The HTTP transport sits behind the `CompletionTransport` trait so tests
//! substitute a scripted transport without any network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// A single failed attempt against the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Provider error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl ProviderError {
    /// Transient failures are worth retrying: rate limits, connection drops,
    /// timeouts. Anything the provider reports as a request-level error is
    /// permanent and fails immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Connection { .. }
                | ProviderError::Timeout
        )
    }
}

/// Terminal outcome of a completion call.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    #[error("Exhausted {attempts} retries: {source}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    #[error("Model returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI-compatible chat completions)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    usage: ChatUsage,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// One successful completion: the assistant text and the tokens it cost.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub tokens_used: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Transport seam
// ────────────────────────────────────────────────────────────────────────────

/// One attempt against the provider. `ModelClient` owns retries; a transport
/// only ever reports the outcome of a single request.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<Completion, ProviderError>;
}

/// Production transport speaking the chat-completions HTTP API.
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
}

impl HttpTransport {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<Completion, ProviderError> {
        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited { message });
            }
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(classify_request_error)?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(Completion {
            content,
            tokens_used: completion.usage.total_tokens,
        })
    }
}

fn classify_request_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Connection {
            message: e.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Client configuration. Constructed once at process start and passed by
/// handle — there is deliberately no global cached instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl ClientConfig {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            max_tokens: 2000,
            temperature: 0.7,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Per-call overrides on top of `ClientConfig`.
#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub json_response: bool,
}

/// Chat-completion client with exponential-backoff retry.
///
/// Per request: Pending → Attempting → {Success | Retrying → Attempting |
/// Failed}. A non-transient provider error is terminal on the spot; only
/// transient failures re-enter Attempting, and only while attempts remain.
#[derive(Clone)]
pub struct ModelClient {
    transport: Arc<dyn CompletionTransport>,
    config: ClientConfig,
}

impl ModelClient {
    pub fn new(config: ClientConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(config.api_key.clone()));
        Self { transport, config }
    }

    /// Substitutes the transport. Test seam, also used to point the client
    /// at a compatible self-hosted endpoint.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn CompletionTransport>) -> Self {
        Self { transport, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Issues a chat completion, retrying transient failures with delay
    /// `retry_delay * 2^attempt`. Exhausting all attempts surfaces
    /// `ExhaustedRetries` wrapping the last underlying failure.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, LlmError> {
        let request = ChatRequest {
            model: options
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: options.json_response.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let mut last_error: Option<ProviderError> = None;

        for attempt in 0..self.config.max_retries {
            match self.transport.send(&request).await {
                Ok(completion) => {
                    if completion.content.is_empty() {
                        return Err(LlmError::EmptyContent);
                    }
                    debug!(
                        model = %request.model,
                        tokens_used = completion.tokens_used,
                        attempt = attempt + 1,
                        "Completion request successful"
                    );
                    return Ok(completion);
                }
                Err(e) if e.is_transient() => {
                    let delay = self.config.retry_delay * 2u32.pow(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient provider failure, backing off"
                    );
                    last_error = Some(e);
                    // Skip the final sleep: there is no attempt left to wait for.
                    if attempt + 1 < self.config.max_retries {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(LlmError::Provider(e)),
            }
        }

        let source = last_error.unwrap_or(ProviderError::Connection {
            message: "no attempts were made".to_string(),
        });
        Err(LlmError::ExhaustedRetries {
            attempts: self.config.max_retries,
            source,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted transport: fails with a transient error `failures` times,
    /// then succeeds. Counts every invocation.
    struct FlakyTransport {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyTransport {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionTransport for FlakyTransport {
        async fn send(&self, _request: &ChatRequest) -> Result<Completion, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ProviderError::RateLimited {
                    message: "Rate limit exceeded".to_string(),
                })
            } else {
                Ok(Completion {
                    content: "success".to_string(),
                    tokens_used: 50,
                })
            }
        }
    }

    struct PermanentFailTransport {
        calls: AtomicU32,
    }

    #[async_trait]
    impl CompletionTransport for PermanentFailTransport {
        async fn send(&self, _request: &ChatRequest) -> Result<Completion, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Api {
                status: 400,
                message: "invalid request".to_string(),
            })
        }
    }

    fn test_config() -> ClientConfig {
        let mut config = ClientConfig::new("test-api-key".to_string(), "gpt-4".to_string());
        config.retry_delay = Duration::from_millis(1);
        config
    }

    fn client_with(transport: Arc<dyn CompletionTransport>) -> ModelClient {
        ModelClient::with_transport(test_config(), transport)
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt_after_two_transient_failures() {
        let transport = Arc::new(FlakyTransport::new(2));
        let client = client_with(transport.clone());

        let completion = client
            .complete("System", "User", &CompletionOptions::default())
            .await
            .unwrap();

        assert_eq!(completion.content, "success");
        assert_eq!(completion.tokens_used, 50);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_after_exactly_three_attempts() {
        let transport = Arc::new(FlakyTransport::new(u32::MAX));
        let client = client_with(transport.clone());

        let err = client
            .complete("System", "User", &CompletionOptions::default())
            .await
            .unwrap_err();

        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
        match err {
            LlmError::ExhaustedRetries { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(source.is_transient());
            }
            other => panic!("Expected ExhaustedRetries, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_permanent_provider_error_fails_without_retry() {
        let transport = Arc::new(PermanentFailTransport {
            calls: AtomicU32::new(0),
        });
        let client = client_with(transport.clone());

        let err = client
            .complete("System", "User", &CompletionOptions::default())
            .await
            .unwrap_err();

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        match err {
            LlmError::Provider(ProviderError::Api { status, .. }) => assert_eq!(status, 400),
            other => panic!("Expected permanent provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_content_is_a_typed_error() {
        struct EmptyTransport;

        #[async_trait]
        impl CompletionTransport for EmptyTransport {
            async fn send(&self, _request: &ChatRequest) -> Result<Completion, ProviderError> {
                Ok(Completion {
                    content: String::new(),
                    tokens_used: 0,
                })
            }
        }

        let client = client_with(Arc::new(EmptyTransport));
        let err = client
            .complete("System", "User", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_model_override_and_json_format_reach_the_transport() {
        struct CapturingTransport {
            seen_model: std::sync::Mutex<Option<String>>,
            seen_json: AtomicU32,
        }

        #[async_trait]
        impl CompletionTransport for CapturingTransport {
            async fn send(&self, request: &ChatRequest) -> Result<Completion, ProviderError> {
                *self.seen_model.lock().unwrap() = Some(request.model.clone());
                if request.response_format.is_some() {
                    self.seen_json.store(1, Ordering::SeqCst);
                }
                Ok(Completion {
                    content: "{}".to_string(),
                    tokens_used: 1,
                })
            }
        }

        let transport = Arc::new(CapturingTransport {
            seen_model: std::sync::Mutex::new(None),
            seen_json: AtomicU32::new(0),
        });
        let client = client_with(transport.clone());

        client
            .complete(
                "System",
                "User",
                &CompletionOptions {
                    model: Some("gpt-3.5-turbo".to_string()),
                    json_response: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(
            transport.seen_model.lock().unwrap().as_deref(),
            Some("gpt-3.5-turbo")
        );
        assert_eq!(transport.seen_json.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Timeout.is_transient());
        assert!(ProviderError::RateLimited {
            message: String::new()
        }
        .is_transient());
        assert!(ProviderError::Connection {
            message: String::new()
        }
        .is_transient());
        assert!(!ProviderError::Api {
            status: 400,
            message: String::new()
        }
        .is_transient());
    }
}
