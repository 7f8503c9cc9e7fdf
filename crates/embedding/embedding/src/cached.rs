//! Caching wrapper around any embedding backend.
//!
//! External interactions: delegates cache misses to the wrapped
//! EmbeddingService (e.g. OpenAI); hits never leave the process.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::cache::EmbeddingCache;
use crate::EmbeddingService;

/// Embedding service that consults a shared [`EmbeddingCache`] before
/// calling the wrapped backend.
///
/// `embed_batch` partitions its input into cached and uncached texts and
/// issues exactly one upstream batch call for the uncached subset, then
/// merges results back into input order. If the upstream call fails the
/// whole batch fails; already-cached entries are unaffected.
pub struct CachedEmbedding {
    upstream: Arc<dyn EmbeddingService>,
    cache: EmbeddingCache,
}

impl CachedEmbedding {
    /// Wraps `upstream` with the given cache. Pass a clone of the same
    /// cache handle to share one bounded cache across providers.
    pub fn new(upstream: Arc<dyn EmbeddingService>, cache: EmbeddingCache) -> Self {
        Self { upstream, cache }
    }

    /// Returns a handle to the underlying cache (for sharing and tests).
    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }
}

#[async_trait]
impl EmbeddingService for CachedEmbedding {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        if let Some(vector) = self.cache.get(text).await {
            debug!(dimension = vector.len(), "embedding cache hit");
            return Ok(vector);
        }

        // Cache lock is not held across the external call.
        let vector = self.upstream.embed(text).await?;
        self.cache.insert(text, vector.clone()).await;
        Ok(vector)
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut miss_indices: Vec<usize> = Vec::new();
        let mut miss_texts: Vec<String> = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match self.cache.get(text).await {
                Some(vector) => results.push(Some(vector)),
                None => {
                    results.push(None);
                    miss_indices.push(i);
                    miss_texts.push(text.clone());
                }
            }
        }

        debug!(
            hits = texts.len() - miss_texts.len(),
            misses = miss_texts.len(),
            "embed_batch cache partition"
        );

        if !miss_texts.is_empty() {
            // One upstream call for all misses; a failure fails the batch.
            let vectors = self.upstream.embed_batch(&miss_texts).await?;
            if vectors.len() != miss_texts.len() {
                return Err(anyhow::anyhow!(
                    "Expected {} embeddings, got {}",
                    miss_texts.len(),
                    vectors.len()
                ));
            }
            for (slot, (text, vector)) in miss_indices
                .into_iter()
                .zip(miss_texts.into_iter().zip(vectors.into_iter()))
            {
                self.cache.insert(&text, vector.clone()).await;
                results[slot] = Some(vector);
            }
        }

        Ok(results.into_iter().flatten().collect())
    }
}
