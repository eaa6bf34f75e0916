//! Language-model clients used to phrase specialist replies.
//!
//! Two wire formats are supported: OpenAI-style `/chat/completions` (OpenAI and Ollama) and
//! the Anthropic messages API. Both retry transport errors, `429` and `5xx` responses up to
//! the configured limit.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use concierge_core::config::{LlmConfig, LlmProvider};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;
const RETRY_BACKOFF_MS: u64 = 250;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("llm provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm provider returned no text")]
    EmptyResponse,
    #[error("llm client misconfigured: {0}")]
    Configuration(String),
}

impl LlmError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(error) => error.is_timeout() || error.is_connect() || error.is_request(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyResponse | Self::Configuration(_) => false,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> &'static str;
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError>;
}

/// Builds the configured client; `None` when the provider is disabled.
pub fn build_llm_client(config: &LlmConfig) -> Result<Option<Arc<dyn LlmClient>>, LlmError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::Disabled => return Ok(None),
        LlmProvider::OpenAi => Arc::new(OpenAiCompatibleClient {
            provider: "openai",
            http,
            base_url: config.base_url.clone().unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            api_key: Some(required_key(config)?),
            model: config.model.clone(),
            max_retries: config.max_retries,
        }),
        LlmProvider::Ollama => Arc::new(OpenAiCompatibleClient {
            provider: "ollama",
            http,
            base_url: config.base_url.clone().ok_or_else(|| {
                LlmError::Configuration("ollama requires llm.base_url".to_string())
            })?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        }),
        LlmProvider::Anthropic => Arc::new(AnthropicClient {
            http,
            base_url: config.base_url.clone().unwrap_or_else(|| ANTHROPIC_BASE_URL.to_string()),
            api_key: required_key(config)?,
            model: config.model.clone(),
            max_retries: config.max_retries,
        }),
    };
    Ok(Some(client))
}

fn required_key(config: &LlmConfig) -> Result<SecretString, LlmError> {
    config.api_key.clone().ok_or_else(|| {
        LlmError::Configuration(format!("provider {:?} requires llm.api_key", config.provider))
    })
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

async fn send_with_retries<F>(
    provider: &'static str,
    max_retries: u32,
    mut build: F,
) -> Result<Value, LlmError>
where
    F: FnMut() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;
    loop {
        let result = match build().send().await {
            Ok(response) => read_json(response).await,
            Err(error) => Err(LlmError::from(error)),
        };

        match result {
            Err(error) if error.is_retryable() && attempt < max_retries => {
                attempt += 1;
                warn!(
                    event_name = "llm.request.retry",
                    provider,
                    attempt,
                    error = %error,
                    "retrying llm request"
                );
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt)))
                    .await;
            }
            other => return other,
        }
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, LlmError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::Status { status: status.as_u16(), body });
    }
    Ok(response.json::<Value>().await?)
}

/// Text of the first choice in a `/chat/completions` response.
pub fn openai_reply_text(body: &Value) -> Result<String, LlmError> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(LlmError::EmptyResponse)
}

/// Concatenated text blocks of an Anthropic messages response.
pub fn anthropic_reply_text(body: &Value) -> Result<String, LlmError> {
    let text = body
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n");

    let text = text.trim();
    if text.is_empty() {
        Err(LlmError::EmptyResponse)
    } else {
        Ok(text.to_string())
    }
}

pub struct OpenAiCompatibleClient {
    provider: &'static str,
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    max_retries: u32,
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    fn provider(&self) -> &'static str {
        self.provider
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let url = endpoint(&self.base_url, "chat/completions");
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user }
            ],
            "temperature": 0.2
        });

        let response = send_with_retries(self.provider, self.max_retries, || {
            let builder = self.http.post(&url).json(&body);
            match &self.api_key {
                Some(key) => builder.bearer_auth(key.expose_secret()),
                None => builder,
            }
        })
        .await?;
        openai_reply_text(&response)
    }
}

pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    max_retries: u32,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let url = endpoint(&self.base_url, "messages");
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": request.system,
            "messages": [{ "role": "user", "content": request.user }]
        });

        let response = send_with_retries("anthropic", self.max_retries, || {
            self.http
                .post(&url)
                .header("x-api-key", self.api_key.expose_secret())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&body)
        })
        .await?;
        anthropic_reply_text(&response)
    }
}
