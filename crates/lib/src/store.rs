//! Store contracts for the pipeline and an in-memory implementation.
//!
//! The pipeline only sees traits (bot config, keyword rules, history) so tests
//! and the CLI can inject doubles. `MemoryStore` implements all of them plus
//! the append-only transcript, seeded from the config file's bot entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::context::Exchange;
use crate::keyword::KeywordRule;
use crate::pipeline::DecisionKind;

/// Per-decision snapshot of a bot's configuration. Loaded fresh for every
/// inbound message and never mutated by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub id: String,
    pub name: String,
    pub ai_enabled: bool,
    /// System prompt for the generative backend.
    pub personality: String,
    /// Static reply when AI is disabled. Blank falls back to the system default.
    pub fallback: String,
    /// Delivery credential (Instagram page access token). None disables delivery.
    pub access_token: Option<String>,
}

/// One persisted transcript row: customer message, bot response, and how the
/// response was produced. Append-only, one per decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub id: String,
    pub bot_id: String,
    pub customer_id: String,
    pub customer_message: String,
    pub bot_response: String,
    pub kind: DecisionKind,
    pub latency_ms: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Bot configuration lookup. NotFound when no active bot matches the id.
#[async_trait]
pub trait BotConfigProvider: Send + Sync {
    async fn config(&self, bot_id: &str) -> Result<BotConfig, StoreError>;
}

/// Active keyword rules for a bot, ordered priority desc then id asc.
#[async_trait]
pub trait KeywordStore: Send + Sync {
    async fn active_rules(&self, bot_id: &str) -> Result<Vec<KeywordRule>, StoreError>;
}

/// Recent completed exchanges for a bot, newest first.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn recent_exchanges(&self, bot_id: &str, limit: usize)
        -> Result<Vec<Exchange>, StoreError>;
}

/// Append-only transcript of decisions, persisted before delivery.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn append(&self, record: DecisionRecord) -> Result<(), StoreError>;
}

/// In-memory store: bots and rules seeded once, transcript grows per message.
/// The transcript doubles as the history source, so a delivered reply feeds
/// the next decision's context window.
pub struct MemoryStore {
    bots: Arc<RwLock<HashMap<String, BotConfig>>>,
    rules: Arc<RwLock<HashMap<String, Vec<KeywordRule>>>>,
    transcript: Arc<RwLock<HashMap<String, Vec<DecisionRecord>>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            bots: Arc::new(RwLock::new(HashMap::new())),
            rules: Arc::new(RwLock::new(HashMap::new())),
            transcript: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed bots and keyword rules from the config file. Inactive bot entries
    /// are skipped entirely; rule ids are assigned in declaration order so the
    /// matcher's tie-break is stable across runs.
    pub async fn seed_from_config(&self, config: &Config) {
        let mut bots = self.bots.write().await;
        let mut rules = self.rules.write().await;
        let mut next_rule_id: u64 = 1;
        for entry in &config.bots {
            if !entry.active {
                log::debug!("store: skipping inactive bot {}", entry.id);
                continue;
            }
            bots.insert(entry.id.clone(), entry.bot_config());
            let bot_rules: Vec<KeywordRule> = entry
                .keywords
                .iter()
                .map(|k| {
                    let id = next_rule_id;
                    next_rule_id += 1;
                    KeywordRule {
                        id,
                        keyword: k.keyword.clone(),
                        response: k.response.clone(),
                        priority: k.priority,
                        active: k.active,
                    }
                })
                .collect();
            rules.insert(entry.id.clone(), bot_rules);
        }
    }

    /// Insert or replace a bot (tests and programmatic setup).
    pub async fn put_bot(&self, bot: BotConfig) {
        self.bots.write().await.insert(bot.id.clone(), bot);
    }

    /// Replace a bot's rule set (tests and programmatic setup).
    pub async fn put_rules(&self, bot_id: impl Into<String>, rules: Vec<KeywordRule>) {
        self.rules.write().await.insert(bot_id.into(), rules);
    }

    /// All transcript records for a bot, oldest first.
    pub async fn records(&self, bot_id: &str) -> Vec<DecisionRecord> {
        self.transcript
            .read()
            .await
            .get(bot_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl BotConfigProvider for MemoryStore {
    async fn config(&self, bot_id: &str) -> Result<BotConfig, StoreError> {
        self.bots
            .read()
            .await
            .get(bot_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl KeywordStore for MemoryStore {
    async fn active_rules(&self, bot_id: &str) -> Result<Vec<KeywordRule>, StoreError> {
        let g = self.rules.read().await;
        let mut out: Vec<KeywordRule> = g
            .get(bot_id)
            .map(|v| v.iter().filter(|r| r.active).cloned().collect())
            .unwrap_or_default();
        out.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        Ok(out)
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn recent_exchanges(
        &self,
        bot_id: &str,
        limit: usize,
    ) -> Result<Vec<Exchange>, StoreError> {
        let g = self.transcript.read().await;
        let records = match g.get(bot_id) {
            Some(r) => r,
            None => return Ok(Vec::new()),
        };
        Ok(records
            .iter()
            .rev()
            .take(limit)
            .map(|r| Exchange {
                customer_message: r.customer_message.clone(),
                bot_response: r.bot_response.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl TranscriptStore for MemoryStore {
    async fn append(&self, record: DecisionRecord) -> Result<(), StoreError> {
        let mut g = self.transcript.write().await;
        g.entry(record.bot_id.clone()).or_default().push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot(id: &str) -> BotConfig {
        BotConfig {
            id: id.to_string(),
            name: "test bot".to_string(),
            ai_enabled: false,
            personality: String::new(),
            fallback: String::new(),
            access_token: None,
        }
    }

    fn record(bot_id: &str, n: usize) -> DecisionRecord {
        DecisionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            bot_id: bot_id.to_string(),
            customer_id: "cust-1".to_string(),
            customer_message: format!("question {}", n),
            bot_response: format!("answer {}", n),
            kind: DecisionKind::Fallback,
            latency_ms: 1,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_bot_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.config("nope").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn active_rules_sorted_by_priority_then_id() {
        let store = MemoryStore::new();
        store.put_bot(bot("b1")).await;
        store
            .put_rules(
                "b1",
                vec![
                    KeywordRule {
                        id: 1,
                        keyword: "a".into(),
                        response: "ra".into(),
                        priority: 0,
                        active: true,
                    },
                    KeywordRule {
                        id: 2,
                        keyword: "b".into(),
                        response: "rb".into(),
                        priority: 5,
                        active: true,
                    },
                    KeywordRule {
                        id: 3,
                        keyword: "c".into(),
                        response: "rc".into(),
                        priority: 5,
                        active: false,
                    },
                ],
            )
            .await;
        let rules = store.active_rules("b1").await.expect("rules");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, 2);
        assert_eq!(rules[1].id, 1);
    }

    #[tokio::test]
    async fn recent_exchanges_newest_first_and_limited() {
        let store = MemoryStore::new();
        for n in 1..=4 {
            store.append(record("b1", n)).await.expect("append");
        }
        let recent = store.recent_exchanges("b1", 2).await.expect("recent");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].customer_message, "question 4");
        assert_eq!(recent[1].customer_message, "question 3");
    }

    #[tokio::test]
    async fn unknown_bot_has_empty_history() {
        let store = MemoryStore::new();
        let recent = store.recent_exchanges("b1", 5).await.expect("recent");
        assert!(recent.is_empty());
    }
}
