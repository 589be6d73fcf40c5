//! # EduGenius Providers
//!
//! Embedding and chat provider implementations for EduGenius.
//!
//! All OpenAI-compatible providers (OpenAI, SiliconFlow, DeepSeek, Ollama)
//! are handled by a single `OpenAiCompatibleProvider`. The `HashEmbedder`
//! covers offline deployments with no API at all.

pub mod hash;
pub mod openai_compatible;
pub mod provider_registry;

use std::sync::Arc;

use edugenius_core::config::EduGeniusConfig;
use edugenius_core::error::{EduGeniusError, Result};
use edugenius_core::traits::{ChatModel, Embedder};

use openai_compatible::{OpenAiCompatibleProvider, ProviderRole};

/// Create the embedding provider named by `[embedding].provider`.
pub fn create_embedder(config: &EduGeniusConfig) -> Result<Arc<dyn Embedder>> {
    let name = config.embedding.provider.as_str();
    match name {
        // Offline token-hash embeddings — not OpenAI-compatible
        "hash" => Ok(Arc::new(hash::HashEmbedder::new(config.embedding.dimension))),

        // Custom endpoint: "custom:https://my-server.com/v1"
        other if other.starts_with("custom:") => Ok(Arc::new(
            OpenAiCompatibleProvider::custom(other, config, ProviderRole::Embedding)?,
        )),

        // All known OpenAI-compatible providers
        _ => {
            let registry = provider_registry::get_provider_config(name)
                .ok_or_else(|| EduGeniusError::ProviderNotFound(name.into()))?;
            Ok(Arc::new(OpenAiCompatibleProvider::from_registry(
                registry,
                config,
                ProviderRole::Embedding,
            )?))
        }
    }
}

/// Create the chat provider named by `[chat].provider`.
pub fn create_chat_model(config: &EduGeniusConfig) -> Result<Arc<dyn ChatModel>> {
    let name = config.chat.provider.as_str();
    match name {
        other if other.starts_with("custom:") => Ok(Arc::new(
            OpenAiCompatibleProvider::custom(other, config, ProviderRole::Chat)?,
        )),
        _ => {
            let registry = provider_registry::get_provider_config(name)
                .ok_or_else(|| EduGeniusError::ProviderNotFound(name.into()))?;
            Ok(Arc::new(OpenAiCompatibleProvider::from_registry(
                registry,
                config,
                ProviderRole::Chat,
            )?))
        }
    }
}

/// List all available embedding provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = provider_registry::all_provider_names();
    names.push("hash");
    names.push("custom");
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_hash_embedder() {
        let config = EduGeniusConfig::default();
        // Default provider is "hash": no network, no key
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.name(), "hash");
    }

    #[test]
    fn test_create_registry_embedder() {
        let mut config = EduGeniusConfig::default();
        config.embedding.provider = "siliconflow".into();
        config.embedding.api_key = "sk-test".into();
        let embedder = create_embedder(&config).unwrap();
        assert_eq!(embedder.name(), "siliconflow");
    }

    #[test]
    fn test_create_custom_chat_model() {
        let mut config = EduGeniusConfig::default();
        config.chat.provider = "custom:http://localhost:8080/v1".into();
        config.chat.model = "local".into();
        let chat = create_chat_model(&config).unwrap();
        assert_eq!(chat.name(), "custom");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = EduGeniusConfig::default();
        config.embedding.provider = "nope".into();
        assert!(matches!(
            create_embedder(&config),
            Err(EduGeniusError::ProviderNotFound(_))
        ));

        config.chat.provider = "nope".into();
        assert!(matches!(
            create_chat_model(&config),
            Err(EduGeniusError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn test_available_providers_include_extras() {
        let names = available_providers();
        assert!(names.contains(&"hash"));
        assert!(names.contains(&"custom"));
        assert!(names.contains(&"openai"));
    }
}
