//! # Text Embeddings
//!
//! This crate defines the embedding service interface for generating text embeddings,
//! plus the pieces every backend shares: cosine similarity, an env-based config, and
//! a bounded process-wide cache ([`EmbeddingCache`] / [`CachedEmbedding`]) that avoids
//! re-embedding identical text.

use async_trait::async_trait;

mod cache;
mod cached;
mod config;
mod similarity;

pub use cache::EmbeddingCache;
pub use cached::CachedEmbedding;
pub use config::{EmbeddingConfig, EnvEmbeddingConfig};
pub use similarity::{cosine_similarity, EmbeddingError};

/// Service for generating text embeddings.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Generates embedding vectors for multiple texts in a single API call.
    /// This is more efficient than calling `embed` multiple times.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error>;
}
