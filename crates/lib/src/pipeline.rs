//! Message decision pipeline: keyword check first, then AI or static fallback.
//!
//! One decision per inbound message, no shared state between decisions, so
//! the pipeline can run concurrently across messages. A blank message is a
//! no-op decided before the latency clock starts; a missing bot aborts the
//! decision; generation failures never surface — the generator degrades
//! internally and the decision kind records it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::channels::InboundMessage;
use crate::context;
use crate::generate::ResponseGenerator;
use crate::keyword;
use crate::store::{BotConfigProvider, HistoryStore, KeywordStore, StoreError};

/// How a response was produced (persisted for analytics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Keyword,
    Ai,
    /// The AI path was attempted but the backend failed; the response is the
    /// apology text. Kept distinct from `Ai` so analytics can tell them apart.
    AiDegraded,
    Fallback,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Keyword => "keyword",
            DecisionKind::Ai => "ai",
            DecisionKind::AiDegraded => "ai_degraded",
            DecisionKind::Fallback => "fallback",
        }
    }
}

/// The one artifact a decision produces: response text (never empty), how it
/// was produced, and wall-clock latency. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub response: String,
    pub kind: DecisionKind,
    pub latency_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no active bot for id {0}")]
    BotNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates one decision: load config, keyword short-circuit, then AI or
/// fallback. Collaborators are injected so tests can script them.
pub struct Pipeline {
    bots: Arc<dyn BotConfigProvider>,
    keywords: Arc<dyn KeywordStore>,
    history: Arc<dyn HistoryStore>,
    generator: ResponseGenerator,
    window: usize,
}

impl Pipeline {
    pub fn new(
        bots: Arc<dyn BotConfigProvider>,
        keywords: Arc<dyn KeywordStore>,
        history: Arc<dyn HistoryStore>,
        generator: ResponseGenerator,
        window: usize,
    ) -> Self {
        Self {
            bots,
            keywords,
            history,
            generator,
            window,
        }
    }

    /// Decide the reply for one inbound message. `Ok(None)` for blank input
    /// (nothing is persisted or delivered); `Err` only when the bot is
    /// unknown or a store fetch fails — never for generation trouble.
    pub async fn decide(&self, inbound: &InboundMessage) -> Result<Option<Decision>, PipelineError> {
        let text = inbound.text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let started = Instant::now();
        let bot = self.bots.config(&inbound.bot_id).await.map_err(|e| match e {
            StoreError::NotFound => PipelineError::BotNotFound(inbound.bot_id.clone()),
            other => PipelineError::Store(other),
        })?;

        let rules = self.keywords.active_rules(&bot.id).await?;
        if let Some(rule) = keyword::match_keyword(text, &rules) {
            log::debug!("pipeline: bot {} keyword hit on rule {}", bot.id, rule.id);
            return Ok(Some(Decision {
                response: rule.response.clone(),
                kind: DecisionKind::Keyword,
                latency_ms: started.elapsed().as_millis() as u64,
            }));
        }

        if bot.ai_enabled {
            let exchanges = self.history.recent_exchanges(&bot.id, self.window).await?;
            let window = context::build_context(&exchanges, self.window);
            let reply = self.generator.generate(text, &bot.personality, &window).await;
            let kind = if reply.degraded {
                DecisionKind::AiDegraded
            } else {
                DecisionKind::Ai
            };
            return Ok(Some(Decision {
                response: reply.text,
                kind,
                latency_ms: started.elapsed().as_millis() as u64,
            }));
        }

        Ok(Some(Decision {
            response: self.generator.fallback_text(&bot.fallback),
            kind: DecisionKind::Fallback,
            latency_ms: started.elapsed().as_millis() as u64,
        }))
    }
}
