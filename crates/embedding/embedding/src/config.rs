//! Embedding configuration: trait and env-based implementation.

use anyhow::Result;
use std::env;

/// Default bound for the process-wide embedding cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Embedding service configuration interface.
pub trait EmbeddingConfig: Send + Sync {
    fn provider(&self) -> &str;
    /// API key for OpenAI-compatible embedding (OPENAI_API_KEY).
    fn api_key(&self) -> &str;
    /// Optional base URL for OpenAI-compatible endpoints (OPENAI_BASE_URL).
    fn base_url(&self) -> Option<&str>;
    /// Embedding model name (EMBEDDING_MODEL).
    fn model(&self) -> &str;
    /// Maximum entries held by the embedding cache (EMBEDDING_CACHE_CAPACITY).
    fn cache_capacity(&self) -> usize;
}

/// Embedding config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvEmbeddingConfig {
    pub embedding_provider: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub cache_capacity: usize,
}

impl EmbeddingConfig for EnvEmbeddingConfig {
    fn provider(&self) -> &str {
        &self.embedding_provider
    }
    fn api_key(&self) -> &str {
        &self.api_key
    }
    fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|s| !s.is_empty())
    }
    fn model(&self) -> &str {
        &self.model
    }
    fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }
}

impl EnvEmbeddingConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let embedding_provider =
            env::var("EMBEDDING_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let base_url = env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let model = env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());
        let cache_capacity = match env::var("EMBEDDING_CACHE_CAPACITY") {
            Ok(raw) => raw.parse().map_err(|_| {
                anyhow::anyhow!("EMBEDDING_CACHE_CAPACITY must be a positive integer, got {raw:?}")
            })?,
            Err(_) => DEFAULT_CACHE_CAPACITY,
        };
        Ok(Self {
            embedding_provider,
            api_key,
            base_url,
            model,
            cache_capacity,
        })
    }

    /// Validate config (e.g. openai requires OPENAI_API_KEY).
    pub fn validate(&self) -> Result<()> {
        if self.embedding_provider.eq_ignore_ascii_case("openai") && self.api_key.is_empty() {
            anyhow::bail!("EMBEDDING_PROVIDER=openai requires OPENAI_API_KEY to be set");
        }
        if self.cache_capacity == 0 {
            anyhow::bail!("EMBEDDING_CACHE_CAPACITY must be at least 1");
        }
        Ok(())
    }
}
