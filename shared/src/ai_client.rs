//! Clients for the upstream text-generation providers.
//!
//! Both supported providers speak the OpenAI chat-completions wire format;
//! they differ in endpoint, authentication, and generation limits. Provider
//! failures are not retried here and propagate to the caller untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::Settings;

const SYSTEM_PROMPT: &str =
    "You are an expert interview question generator. Generate questions in the exact JSON format specified.";

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("API key is not configured")]
    MissingKey,
    #[error("network error: {0}")]
    Network(String),
    #[error("http error: {0}")]
    Http(u16),
    #[error("parse error: {0}")]
    Parse(serde_json::Error),
    #[error("provider returned empty completion")]
    EmptyCompletion,
}

/// A text-generation backend: prompt and temperature in, one completion out.
#[async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError>;
}

/// Pick the provider configured in the settings. Unknown names fall back to
/// Hugging Face with a warning.
pub fn from_settings(settings: &Settings) -> Arc<dyn AiProvider> {
    match settings.ai_provider.to_ascii_lowercase().as_str() {
        "openai" => Arc::new(OpenAiProvider::new(
            &settings.openai_api_key,
            &settings.openai_api_base,
            &settings.openai_model,
        )),
        "huggingface" | "hf" => Arc::new(HuggingFaceProvider::new(
            &settings.huggingface_api_key,
            &settings.huggingface_api_base,
            &settings.huggingface_model,
        )),
        other => {
            warn!("unknown AI provider '{other}', falling back to Hugging Face");
            Arc::new(HuggingFaceProvider::new(
                &settings.huggingface_api_key,
                &settings.huggingface_api_base,
                &settings.huggingface_model,
            ))
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

/// Send a chat request and return the assistant's answer.
///
/// Logs status and a body preview on the debug level.
async fn post_chat(
    client: &Client,
    url: &str,
    bearer: Option<&str>,
    req: &ChatRequest<'_>,
) -> Result<String, ProviderError> {
    debug!(model = req.model, %url, "→ chat request");

    let mut builder = client.post(url).json(req);
    if let Some(key) = bearer {
        builder = builder.bearer_auth(key);
    }

    let res = builder.send().await.map_err(|e| {
        error!("network error to provider: {e}");
        ProviderError::Network(e.to_string())
    })?;

    let status = res.status();
    let bytes = res
        .bytes()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;
    debug!(
        %status,
        "← body = {}",
        String::from_utf8_lossy(&bytes[..bytes.len().min(1024)])
    );

    if !status.is_success() {
        return Err(ProviderError::Http(status.as_u16()));
    }

    let chat: ChatCompletion = serde_json::from_slice(&bytes).map_err(ProviderError::Parse)?;
    let answer = chat
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    if answer.trim().is_empty() {
        return Err(ProviderError::EmptyCompletion);
    }
    Ok(answer)
}

fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .unwrap_or_default()
}

/// OpenAI chat completions. Requires an API key.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError> {
        let key = self.api_key.trim();
        if key.is_empty() || key.contains("your-api-key") {
            return Err(ProviderError::MissingKey);
        }
        info!("using OpenAI API with model: {}", self.model);

        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature,
            max_tokens: 2000,
            stream: false,
        };

        let url = format!("{}/v1/chat/completions", self.api_base);
        post_chat(&self.client, &url, Some(key), &req).await
    }
}

/// Hugging Face router, OpenAI-compatible chat endpoint. The key is
/// optional; some models answer unauthenticated calls.
pub struct HuggingFaceProvider {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl HuggingFaceProvider {
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Self {
        Self {
            client: http_client(),
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl AiProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, ProviderError> {
        info!("using Hugging Face API with model: {}", self.model);

        let key = self.api_key.trim();
        let bearer = if key.is_empty() {
            warn!("no Hugging Face API key provided - some models may reject unauthenticated calls");
            None
        } else {
            Some(key)
        };

        let req = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            // raised so complete JSON responses fit without truncation
            max_tokens: 7500,
            stream: false,
        };

        let url = format!("{}/v1/chat/completions", self.api_base);
        post_chat(&self.client, &url, bearer, &req).await
    }
}
