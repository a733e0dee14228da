//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.relay/config.json`) and
//! environment. Bots and their keyword rules are declared here and seed the
//! in-memory store at startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default system prompt when a bot declares none.
pub const DEFAULT_PERSONALITY: &str =
    "You are a helpful assistant for a fashion e-commerce business. Be friendly, concise, and professional.";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Claude backend settings.
    #[serde(default)]
    pub claude: ClaudeConfig,

    /// Context window settings for the AI path.
    #[serde(default)]
    pub context: ContextConfig,

    /// Instagram delivery settings.
    #[serde(default)]
    pub instagram: InstagramConfig,

    /// Bots served by this relay, with their keyword rules.
    #[serde(default)]
    pub bots: Vec<BotEntry>,
}

/// Claude API settings (key, model, token budget, timeout).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeConfig {
    /// API key. Overridden by ANTHROPIC_API_KEY env when set.
    pub api_key: Option<String>,

    /// Model name (default claude-3-5-sonnet-20241022).
    pub model: Option<String>,

    /// Completion budget per reply; keeps replies concise and cost bounded.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Backend call timeout in seconds; a hang degrades like any backend error.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Override the API base URL (tests, proxies).
    pub base_url: Option<String>,
}

fn default_max_tokens() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }
}

/// Context window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextConfig {
    /// Recent exchanges included in the AI context (two turns each).
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_window_size() -> usize {
    5
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

/// Instagram Graph API settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstagramConfig {
    /// Override the Graph API base URL (tests, API version bumps).
    pub api_base: Option<String>,
}

/// One bot declaration: identity, AI settings, credential, keyword rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotEntry {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Inactive bots are not served; their messages abort with BotNotFound.
    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default = "default_true")]
    pub ai_enabled: bool,

    /// System prompt for the AI path; blank uses the system default.
    #[serde(default)]
    pub personality: String,

    /// Static reply when AI is disabled; blank uses the system default.
    #[serde(default)]
    pub fallback: String,

    /// Instagram page access token for delivery. Omit to skip delivery.
    pub access_token: Option<String>,

    #[serde(default)]
    pub keywords: Vec<KeywordEntry>,
}

fn default_true() -> bool {
    true
}

impl BotEntry {
    /// Per-decision snapshot of this entry.
    pub fn bot_config(&self) -> crate::store::BotConfig {
        let personality = if self.personality.trim().is_empty() {
            DEFAULT_PERSONALITY.to_string()
        } else {
            self.personality.clone()
        };
        crate::store::BotConfig {
            id: self.id.clone(),
            name: self.name.clone(),
            ai_enabled: self.ai_enabled,
            personality,
            fallback: self.fallback.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

/// One keyword rule declaration. Ids are assigned in declaration order when
/// the store is seeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordEntry {
    pub keyword: String,
    pub response: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Resolve the Claude API key: env ANTHROPIC_API_KEY overrides config.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .claude
                .api_key
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("RELAY_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".relay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or RELAY_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
