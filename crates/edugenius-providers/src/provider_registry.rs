//! Provider registry — maps provider names to endpoint configurations.
//!
//! All OpenAI-compatible providers are defined here as static config entries.
//! The unified `OpenAiCompatibleProvider` uses these configs to connect to any
//! of them, for embeddings and for chat alike.

/// How to attach auth credentials to requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// No authentication required (local servers).
    None,
}

/// Configuration for a single provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier.
    pub name: &'static str,
    /// Base URL for the API.
    pub base_url: &'static str,
    /// Path for the embeddings endpoint (appended to base_url).
    pub embeddings_path: &'static str,
    /// Path for chat completions (appended to base_url).
    pub chat_path: &'static str,
    /// Environment variable names to try for the API key (in order).
    pub env_keys: &'static [&'static str],
    /// How to send auth credentials.
    pub auth_style: AuthStyle,
    /// Environment variable to override the base URL (e.g., OLLAMA_HOST).
    pub base_url_env: Option<&'static str>,
    /// Model used for embeddings when the config names none.
    pub default_embedding_model: &'static str,
    /// Model used for chat when the config names none.
    pub default_chat_model: &'static str,
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// All known providers.
static PROVIDERS: &[ProviderConfig] = &[
    ProviderConfig {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        embeddings_path: "/embeddings",
        chat_path: "/chat/completions",
        env_keys: &["OPENAI_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: Some("OPENAI_API_BASE"),
        default_embedding_model: "text-embedding-3-small",
        default_chat_model: "gpt-4o-mini",
    },
    ProviderConfig {
        name: "siliconflow",
        base_url: "https://api.siliconflow.cn/v1",
        embeddings_path: "/embeddings",
        chat_path: "/chat/completions",
        env_keys: &["SILICONFLOW_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: None,
        default_embedding_model: "BAAI/bge-m3",
        default_chat_model: "deepseek-ai/DeepSeek-V3",
    },
    ProviderConfig {
        name: "deepseek",
        base_url: "https://api.deepseek.com",
        embeddings_path: "/embeddings",
        chat_path: "/chat/completions",
        env_keys: &["DEEPSEEK_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: None,
        // DeepSeek serves chat only; pair it with another embedding provider.
        default_embedding_model: "",
        default_chat_model: "deepseek-chat",
    },
    ProviderConfig {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        embeddings_path: "/embeddings",
        chat_path: "/chat/completions",
        env_keys: &[],
        auth_style: AuthStyle::None,
        base_url_env: Some("OLLAMA_HOST"),
        default_embedding_model: "bge-m3",
        default_chat_model: "llama3.2",
    },
];

/// Look up a provider config by name.
pub fn get_provider_config(name: &str) -> Option<&'static ProviderConfig> {
    // Also match aliases
    let lookup = match name {
        "silicon_flow" | "silicon" => "siliconflow",
        "deep_seek" => "deepseek",
        other => other,
    };
    PROVIDERS.iter().find(|p| p.name == lookup)
}

/// List all known provider names.
pub fn all_provider_names() -> Vec<&'static str> {
    PROVIDERS.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let openai = get_provider_config("openai").unwrap();
        assert_eq!(openai.base_url, "https://api.openai.com/v1");
        assert_eq!(openai.auth_style, AuthStyle::Bearer);
        assert_eq!(openai.default_embedding_model, "text-embedding-3-small");
    }

    #[test]
    fn test_lookup_alias() {
        assert_eq!(get_provider_config("silicon").unwrap().name, "siliconflow");
        assert_eq!(get_provider_config("deep_seek").unwrap().name, "deepseek");
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(get_provider_config("definitely-not-a-provider").is_none());
    }

    #[test]
    fn test_local_provider_needs_no_key() {
        let ollama = get_provider_config("ollama").unwrap();
        assert_eq!(ollama.auth_style, AuthStyle::None);
        assert!(ollama.env_keys.is_empty());
    }

    #[test]
    fn test_all_names_unique() {
        let names = all_provider_names();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }
}
