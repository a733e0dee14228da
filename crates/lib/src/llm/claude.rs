//! Claude API client (Anthropic Messages API, non-streaming).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::{ConversationTurn, TurnRole};
use crate::llm::{BackendError, GenerativeBackend};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Client for the Anthropic Messages API.
#[derive(Clone)]
pub struct ClaudeClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self {
            base_url,
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn role(turn: &ConversationTurn) -> &'static str {
        match turn.role {
            TurnRole::Customer => "user",
            TurnRole::Bot => "assistant",
        }
    }
}

#[async_trait]
impl GenerativeBackend for ClaudeClient {
    /// POST /v1/messages — history turns plus the new user turn, personality
    /// as the system string. Returns the first text content block.
    async fn complete(
        &self,
        system: &str,
        history: &[ConversationTurn],
        message: &str,
        max_tokens: u32,
    ) -> Result<String, BackendError> {
        let mut messages: Vec<ApiMessage> = history
            .iter()
            .map(|t| ApiMessage {
                role: Self::role(t),
                content: t.text.clone(),
            })
            .collect();
        messages.push(ApiMessage {
            role: "user",
            content: message.to_string(),
        });

        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: self.model.clone(),
            max_tokens,
            system: system.to_string(),
            messages,
        };
        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;
        if res.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited);
        }
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(BackendError::Api(format!("{} {}", status, body)));
        }
        let data: MessagesResponse = res.json().await?;
        let text = data
            .content
            .into_iter()
            .find(|b| b.typ == "text")
            .map(|b| b.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                BackendError::InvalidResponse("no text content block in response".to_string())
            })?;
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ApiMessage>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    typ: String,
    #[serde(default)]
    text: String,
}
