//! Generative backend abstraction and Claude client.
//!
//! The pipeline's generator talks to `GenerativeBackend` so tests can inject
//! doubles; `ClaudeClient` is the production implementation.

mod claude;

pub use claude::{ClaudeClient, DEFAULT_MODEL};

use crate::context::ConversationTurn;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("backend rate limited")]
    RateLimited,
    #[error("backend api error: {0}")]
    Api(String),
    #[error("malformed backend response: {0}")]
    InvalidResponse(String),
}

/// A generative completion backend: system prompt + prior turns + new message
/// in, bounded completion text out.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        history: &[ConversationTurn],
        message: &str,
        max_tokens: u32,
    ) -> Result<String, BackendError>;
}
