//! TOML configuration parsing.
//!
//! Every section is optional. A missing config file is not an error: the
//! CLI falls back to [`Config::default`], which reads the knowledge base
//! from `data/faqs.json`, so `mitra ask` works from the repository root.
//!
//! The confidence threshold is not configurable; see
//! [`crate::matcher::SIMILARITY_THRESHOLD`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/faqs.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

/// Text shown to the user. Title, greeting and fallback are content, not code.
#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
    #[serde(default = "default_input_placeholder")]
    pub input_placeholder: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            greeting: default_greeting(),
            fallback_message: default_fallback_message(),
            input_placeholder: default_input_placeholder(),
        }
    }
}

fn default_title() -> String {
    "🩺 Hriday Mitra 🫀🫶🏻".to_string()
}
fn default_greeting() -> String {
    "**Disclaimer:** Namaste!🙏 I am your health assistant for information on high blood \
     pressure (Hypertension), based on Indian health guidelines. I am not a doctor. \
     How can I help you today?"
        .to_string()
}
fn default_fallback_message() -> String {
    "I couldn't find a confident answer in my knowledge base. Please try rephrasing your \
     question or consult a healthcare professional for specific advice."
        .to_string()
}
fn default_input_placeholder() -> String {
    "Ask a question about hypertension or CVD...".to_string()
}

impl Config {
    /// Defaults with the knowledge base at `store_path`.
    pub fn with_store(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreConfig {
                path: store_path.into(),
            },
            ..Self::default()
        }
    }
}

/// Parse and validate configuration from a TOML string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.store.path.as_os_str().is_empty() {
        anyhow::bail!("store.path must not be empty");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.assistant.fallback_message.trim().is_empty() {
        anyhow::bail!("assistant.fallback_message must not be empty");
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Load `path` if it exists, otherwise return defaults.
///
/// A config file that exists but fails to parse is still an error.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.store.path, PathBuf::from("data/faqs.json"));
        assert_eq!(cfg.server.bind, "127.0.0.1:8501");
        assert!(cfg.assistant.fallback_message.contains("confident answer"));
    }

    #[test]
    fn test_partial_sections() {
        let cfg = parse_config(
            r#"
[store]
path = "data/kb.json"

[assistant]
title = "Clinic FAQ"
"#,
        )
        .unwrap();
        assert_eq!(cfg.store.path, PathBuf::from("data/kb.json"));
        assert_eq!(cfg.assistant.title, "Clinic FAQ");
        assert_eq!(
            cfg.assistant.input_placeholder,
            "Ask a question about hypertension or CVD..."
        );
    }

    #[test]
    fn test_rejects_empty_bind() {
        let err = parse_config("[server]\nbind = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("server.bind"));
    }

    #[test]
    fn test_rejects_empty_fallback() {
        let err = parse_config("[assistant]\nfallback_message = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("fallback_message"));
    }

    #[test]
    fn test_rejects_non_string_path() {
        assert!(parse_config("[store]\npath = 3\n").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_or_default(&tmp.path().join("missing.toml")).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8501");
        assert_eq!(cfg.store.path, PathBuf::from("data/faqs.json"));
    }

    #[test]
    fn test_load_or_default_reads_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mitra.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:9000\"\n").unwrap();
        let cfg = load_or_default(&path).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
    }

    #[test]
    fn test_load_or_default_surfaces_parse_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mitra.toml");
        std::fs::write(&path, "[store\n").unwrap();
        assert!(load_or_default(&path).is_err());
    }
}
