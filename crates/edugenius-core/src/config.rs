//! EduGenius configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EduGeniusConfig {
    /// Shared API key, used when a section has no key of its own.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

fn default_api_key() -> String {
    String::new()
}

impl Default for EduGeniusConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            embedding: EmbeddingConfig::default(),
            chat: ChatConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl EduGeniusConfig {
    /// Load config from the default path (~/.edugenius/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::EduGeniusError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::EduGeniusError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::EduGeniusError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".edugenius")
            .join("config.toml")
    }

    /// Get the EduGenius home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".edugenius")
    }
}

/// Embedding provider configuration.
///
/// One embedder per deployment: switching providers or models without
/// re-embedding the whole bank invalidates every stored similarity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name: "hash" (local, deterministic), a registry name
    /// ("openai", "ollama", "siliconflow", ...), or "custom:<base-url>".
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    /// Model identifier; empty means the provider's default.
    #[serde(default)]
    pub model: String,
    /// Endpoint override; empty means the provider's registry default.
    #[serde(default)]
    pub endpoint: String,
    /// API key override; empty falls back to the top-level key, then env vars.
    #[serde(default)]
    pub api_key: String,
    /// Vector width of the local hash embedder.
    #[serde(default = "default_hash_dimension")]
    pub dimension: usize,
    /// Request timeout; expiry counts as a provider failure.
    #[serde(default = "default_embed_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_provider() -> String {
    "hash".into()
}
fn default_hash_dimension() -> usize {
    384
}
fn default_embed_timeout() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: String::new(),
            endpoint: String::new(),
            api_key: String::new(),
            dimension: default_hash_dimension(),
            timeout_secs: default_embed_timeout(),
        }
    }
}

/// Chat model configuration (answer-with-practice flow).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_provider")]
    pub provider: String,
    /// Model identifier; empty means the provider's default.
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

fn default_chat_provider() -> String {
    "openai".into()
}
fn default_chat_timeout() -> u64 {
    60
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_chat_provider(),
            model: String::new(),
            endpoint: String::new(),
            api_key: String::new(),
            timeout_secs: default_chat_timeout(),
        }
    }
}

/// Question store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path; tilde is expanded by the binary.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "~/.edugenius/edugenius.db".into()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EduGeniusConfig::default();
        assert_eq!(config.embedding.provider, "hash");
        assert_eq!(config.embedding.dimension, 384);
        assert_eq!(config.chat.provider, "openai");
        assert!(config.database.path.ends_with("edugenius.db"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            api_key = "sk-shared"

            [embedding]
            provider = "ollama"
            model = "bge-m3"

            [database]
            path = "/tmp/bank.db"
        "#;

        let config: EduGeniusConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "sk-shared");
        assert_eq!(config.embedding.provider, "ollama");
        assert_eq!(config.embedding.model, "bge-m3");
        assert_eq!(config.database.path, "/tmp/bank.db");
        // Untouched sections keep their defaults
        assert_eq!(config.chat.provider, "openai");
        assert_eq!(config.embedding.timeout_secs, 30);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let toml_str = "";
        let config: EduGeniusConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.embedding.provider, "hash");
        assert_eq!(config.chat.timeout_secs, 60);
    }

    #[test]
    fn test_home_dir() {
        let home = EduGeniusConfig::home_dir();
        assert!(home.to_string_lossy().contains("edugenius"));
    }
}
