//! Unified OpenAI-compatible provider.
//!
//! A single struct that handles embeddings and chat completions for ALL
//! OpenAI-compatible APIs. Different providers are distinguished only by
//! endpoint URL, auth style, API key, and model name. The same type backs
//! both the `Embedder` and `ChatModel` traits; the construction role picks
//! which config section feeds it.

use std::time::Duration;

use async_trait::async_trait;
use edugenius_core::config::EduGeniusConfig;
use edugenius_core::error::{EduGeniusError, Result};
use edugenius_core::traits::{ChatModel, Embedder};
use serde_json::{Value, json};

use crate::provider_registry::{AuthStyle, ProviderConfig};

/// Which config section a client is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProviderRole {
    Embedding,
    Chat,
}

/// A unified client that works with any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    /// Provider name (e.g., "openai", "siliconflow", "ollama").
    name: String,
    /// API key for authentication.
    api_key: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    base_url: String,
    /// Path for embeddings (e.g., "/embeddings").
    embeddings_path: String,
    /// Path for chat completions (e.g., "/chat/completions").
    chat_path: String,
    /// Model sent with every request.
    model: String,
    /// Authentication style.
    auth_style: AuthStyle,
    /// HTTP client.
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from a known provider config + EduGeniusConfig.
    ///
    /// Resolution order:
    /// - API key: section `api_key` > `config.api_key` > env vars > empty
    /// - Base URL: section `endpoint` > env override > registry default
    /// - Model: section `model` > registry default for the role
    pub fn from_registry(
        registry: &ProviderConfig,
        config: &EduGeniusConfig,
        role: ProviderRole,
    ) -> Result<Self> {
        let (section_api_key, section_model, section_endpoint, timeout_secs) = match role {
            ProviderRole::Embedding => (
                &config.embedding.api_key,
                &config.embedding.model,
                &config.embedding.endpoint,
                config.embedding.timeout_secs,
            ),
            ProviderRole::Chat => (
                &config.chat.api_key,
                &config.chat.model,
                &config.chat.endpoint,
                config.chat.timeout_secs,
            ),
        };

        let api_key = if !section_api_key.is_empty() {
            section_api_key.clone()
        } else if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            registry
                .env_keys
                .iter()
                .find_map(|key| std::env::var(key).ok())
                .unwrap_or_default()
        };

        let base_url = if !section_endpoint.is_empty() {
            section_endpoint.trim_end_matches('/').to_string()
        } else {
            registry
                .base_url_env
                .and_then(|env_key| {
                    let val = std::env::var(env_key).ok()?;
                    // For OLLAMA_HOST and friends, append /v1 if not present
                    if val.ends_with("/v1") {
                        Some(val)
                    } else {
                        Some(format!("{}/v1", val.trim_end_matches('/')))
                    }
                })
                .unwrap_or_else(|| registry.base_url.to_string())
        };

        let model = if !section_model.is_empty() {
            section_model.clone()
        } else {
            match role {
                ProviderRole::Embedding => registry.default_embedding_model.to_string(),
                ProviderRole::Chat => registry.default_chat_model.to_string(),
            }
        };

        Ok(Self {
            name: registry.name.to_string(),
            api_key,
            base_url,
            embeddings_path: registry.embeddings_path.to_string(),
            chat_path: registry.chat_path.to_string(),
            model,
            auth_style: registry.auth_style,
            client: build_client(timeout_secs)?,
        })
    }

    /// Create for a custom endpoint (e.g., "custom:https://my-server.com/v1").
    pub fn custom(endpoint: &str, config: &EduGeniusConfig, role: ProviderRole) -> Result<Self> {
        let base_url = endpoint
            .strip_prefix("custom:")
            .unwrap_or(endpoint)
            .trim_end_matches('/')
            .to_string();

        let (section_api_key, section_model, timeout_secs) = match role {
            ProviderRole::Embedding => (
                &config.embedding.api_key,
                &config.embedding.model,
                config.embedding.timeout_secs,
            ),
            ProviderRole::Chat => (
                &config.chat.api_key,
                &config.chat.model,
                config.chat.timeout_secs,
            ),
        };

        let api_key = if !section_api_key.is_empty() {
            section_api_key.clone()
        } else if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("CUSTOM_API_KEY").unwrap_or_default()
        };

        let auth_style = if api_key.is_empty() {
            AuthStyle::None
        } else {
            AuthStyle::Bearer
        };

        Ok(Self {
            name: "custom".to_string(),
            api_key,
            base_url,
            embeddings_path: "/embeddings".to_string(),
            chat_path: "/chat/completions".to_string(),
            model: section_model.clone(),
            auth_style,
            client: build_client(timeout_secs)?,
        })
    }

    /// Build the auth header for the request.
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }

    fn require_key(&self) -> Result<()> {
        if self.auth_style != AuthStyle::None && self.api_key.is_empty() {
            return Err(EduGeniusError::ApiKeyMissing(self.name.clone()));
        }
        Ok(())
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        let req = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body);
        self.apply_auth(req).send().await.map_err(|e| {
            EduGeniusError::Http(format!("{} connection failed ({}): {}", self.name, url, e))
        })
    }
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| EduGeniusError::Http(e.to_string()))
}

#[async_trait]
impl Embedder for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.require_key()?;

        let url = format!("{}{}", self.base_url, self.embeddings_path);
        let body = json!({
            "model": self.model,
            "input": [text],
        });

        tracing::debug!(
            "🌐 {} embedding request: model={}, {} chars",
            self.name,
            self.model,
            text.len()
        );
        let resp = self.post_json(&url, &body).await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(EduGeniusError::Embedding(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| EduGeniusError::Http(e.to_string()))?;

        let vector = json["data"]
            .get(0)
            .and_then(|d| d["embedding"].as_array())
            .ok_or_else(|| {
                EduGeniusError::Embedding(format!("{}: no embedding in response", self.name))
            })?;

        Ok(vector
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as f32)
            .collect())
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn answer(&self, prompt: &str) -> Result<String> {
        self.require_key()?;

        let url = format!("{}{}", self.base_url, self.chat_path);
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        tracing::debug!(
            "🌐 {} chat request: model={}, {} chars",
            self.name,
            self.model,
            prompt.len()
        );
        let resp = self.post_json(&url, &body).await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(EduGeniusError::Provider(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| EduGeniusError::Http(e.to_string()))?;

        json["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .map(String::from)
            .ok_or_else(|| EduGeniusError::Provider("No choices in response".into()))
    }
}
