//! Initialize the configuration directory: create ~/.relay and a sample config.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{BotEntry, Config, KeywordEntry};

/// Create the config directory and a sample config file if they do not exist.
/// The sample declares one AI-disabled demo bot with a single keyword rule so
/// `relay decide` works without an API key.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        let sample = sample_config();
        let body = serde_json::to_string_pretty(&sample).context("serializing sample config")?;
        std::fs::write(config_path, body)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    } else {
        log::debug!("config already exists at {}, skipping", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}

fn sample_config() -> Config {
    Config {
        bots: vec![BotEntry {
            id: "demo".to_string(),
            name: "Demo shop bot".to_string(),
            active: true,
            ai_enabled: false,
            personality: String::new(),
            fallback: String::new(),
            access_token: None,
            keywords: vec![KeywordEntry {
                keyword: "sale".to_string(),
                response: "Everything is 50% off this week!".to_string(),
                priority: 10,
                active: true,
            }],
        }],
        ..Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;

    #[test]
    fn init_writes_a_loadable_sample_config() {
        let dir = std::env::temp_dir().join(format!("relay-init-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.json");
        init_config_dir(&path).expect("init");
        assert!(path.exists());
        let (config, _) = load_config(Some(path)).expect("load");
        assert_eq!(config.bots.len(), 1);
        assert_eq!(config.bots[0].id, "demo");
        assert_eq!(config.bots[0].keywords[0].keyword, "sale");
    }

    #[test]
    fn init_is_idempotent() {
        let dir = std::env::temp_dir().join(format!("relay-init-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.json");
        init_config_dir(&path).expect("first init");
        std::fs::write(&path, "{\"bots\":[]}").expect("overwrite");
        init_config_dir(&path).expect("second init");
        let s = std::fs::read_to_string(&path).expect("read");
        assert_eq!(s, "{\"bots\":[]}");
    }
}
