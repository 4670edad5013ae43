//! OpenRouter bridge: OpenAI-compatible `/chat/completions` client used for feedback text.
//!
//! API key: `OPENROUTER_API_KEY` (or `JOURNAL_LLM_API_KEY`). Base URL: `OPENROUTER_BASE_URL`.

use crate::error::FeedbackError;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One completion call: model parameters plus the system and user messages.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system: String,
    pub user: String,
}

/// Text-generation backend for feedback. Implemented by [`OpenRouterBridge`]; tests plug in fakes.
#[async_trait]
pub trait FeedbackModel: Send + Sync {
    /// Raw message content of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FeedbackError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenRouterBridge {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterBridge {
    /// `None` when no API key is configured; feedback generation is then skipped.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let key = settings.llm_api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key.to_string(), &settings.llm_base_url))
    }

    pub fn new(api_key: String, base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl FeedbackModel for OpenRouterBridge {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FeedbackError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", "https://contact-journal.app")
            .header("X-Title", "Contact Journal")
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(FeedbackError::Api { status, body });
        }

        let parsed: ChatResponse = res.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(FeedbackError::EmptyResponse)
    }
}
