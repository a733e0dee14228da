//! Response generation with failure-safe degradation.
//!
//! The generator wraps the generative backend behind a bounded timeout. Any
//! backend failure (network, rate limit, malformed response, hang) degrades
//! to the apology text instead of propagating: the customer always gets a
//! reply, and the pipeline records the degradation in the decision kind.

use std::sync::Arc;
use std::time::Duration;

use crate::context::ConversationTurn;
use crate::llm::{BackendError, GenerativeBackend};

/// Apology sent when the backend fails mid-conversation.
pub const APOLOGY: &str = "Izvinite, trenutno ne mogu da odgovorim. Molim vas pokušajte ponovo.";

/// System default when a bot has no fallback text configured.
pub const DEFAULT_FALLBACK: &str = "Hvala na poruci! Naš tim će vam uskoro odgovoriti. 😊";

/// A generated reply and whether the backend path degraded to the apology.
#[derive(Debug, Clone)]
pub struct GeneratedReply {
    pub text: String,
    pub degraded: bool,
}

/// Calls the backend with system prompt + history + new message; degrades
/// locally on any error. Constructed once and shared across decisions.
pub struct ResponseGenerator {
    backend: Arc<dyn GenerativeBackend>,
    timeout: Duration,
    max_tokens: u32,
}

impl ResponseGenerator {
    pub fn new(backend: Arc<dyn GenerativeBackend>, timeout: Duration, max_tokens: u32) -> Self {
        Self {
            backend,
            timeout,
            max_tokens,
        }
    }

    /// Generate a reply for the message with the bot's personality and the
    /// context window. Never fails: backend errors and timeouts return the
    /// apology with `degraded` set.
    pub async fn generate(
        &self,
        message: &str,
        personality: &str,
        history: &[ConversationTurn],
    ) -> GeneratedReply {
        let call = self
            .backend
            .complete(personality, history, message, self.max_tokens);
        let result: Result<String, BackendError> = match tokio::time::timeout(self.timeout, call)
            .await
        {
            Ok(res) => res,
            Err(_) => Err(BackendError::Api(format!(
                "no response within {:?}",
                self.timeout
            ))),
        };
        match result {
            Ok(text) if !text.trim().is_empty() => GeneratedReply {
                text,
                degraded: false,
            },
            Ok(_) => {
                log::warn!("generate: backend returned empty completion, degrading");
                GeneratedReply {
                    text: APOLOGY.to_string(),
                    degraded: true,
                }
            }
            Err(e) => {
                log::warn!("generate: backend error, degrading: {}", e);
                GeneratedReply {
                    text: APOLOGY.to_string(),
                    degraded: true,
                }
            }
        }
    }

    /// The bot's static fallback, or the system default when blank.
    pub fn fallback_text(&self, configured: &str) -> String {
        let t = configured.trim();
        if t.is_empty() {
            DEFAULT_FALLBACK.to_string()
        } else {
            configured.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FailingBackend;

    #[async_trait]
    impl GenerativeBackend for FailingBackend {
        async fn complete(
            &self,
            _system: &str,
            _history: &[ConversationTurn],
            _message: &str,
            _max_tokens: u32,
        ) -> Result<String, BackendError> {
            Err(BackendError::RateLimited)
        }
    }

    struct HangingBackend;

    #[async_trait]
    impl GenerativeBackend for HangingBackend {
        async fn complete(
            &self,
            _system: &str,
            _history: &[ConversationTurn],
            _message: &str,
            _max_tokens: u32,
        ) -> Result<String, BackendError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    struct EchoBackend;

    #[async_trait]
    impl GenerativeBackend for EchoBackend {
        async fn complete(
            &self,
            system: &str,
            history: &[ConversationTurn],
            message: &str,
            _max_tokens: u32,
        ) -> Result<String, BackendError> {
            Ok(format!("{}|{}|{}", system, history.len(), message))
        }
    }

    fn generator(backend: Arc<dyn GenerativeBackend>) -> ResponseGenerator {
        ResponseGenerator::new(backend, Duration::from_millis(50), 300)
    }

    #[tokio::test]
    async fn backend_error_degrades_to_nonempty_apology() {
        let g = generator(Arc::new(FailingBackend));
        let reply = g.generate("hi", "persona", &[]).await;
        assert!(reply.degraded);
        assert!(!reply.text.is_empty());
        assert_eq!(reply.text, APOLOGY);
    }

    #[tokio::test]
    async fn hang_is_treated_as_backend_error() {
        let g = generator(Arc::new(HangingBackend));
        let reply = g.generate("hi", "persona", &[]).await;
        assert!(reply.degraded);
        assert_eq!(reply.text, APOLOGY);
    }

    #[tokio::test]
    async fn success_passes_through_untouched() {
        let g = generator(Arc::new(EchoBackend));
        let history = vec![
            ConversationTurn::customer("q"),
            ConversationTurn::bot("a"),
        ];
        let reply = g.generate("hello", "persona", &history).await;
        assert!(!reply.degraded);
        assert_eq!(reply.text, "persona|2|hello");
    }

    #[tokio::test]
    async fn blank_fallback_uses_system_default() {
        let g = generator(Arc::new(EchoBackend));
        assert_eq!(g.fallback_text("  "), DEFAULT_FALLBACK);
        assert_eq!(g.fallback_text("We'll reply soon"), "We'll reply soon");
    }
}
