//! # OpenAI Embedding Service
//!
//! Implementation of the `EmbeddingService` trait using OpenAI's embeddings API
//! (`text-embedding-3-small` by default, 1536 dimensions). Also works against
//! OpenAI-compatible endpoints via a custom base URL.
//!
//! Requests are subject to rate limits and billing on the provider side; the
//! bounded cache in the `embedding` crate exists to keep both down.

use async_openai::{types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use embedding::EmbeddingService;
use tracing::{debug, info, instrument, warn};

/// Timeout for a single embed request (connect + request + response).
const EMBED_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
/// Timeout for a batch request (longer due to larger payload).
const EMBED_BATCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);
/// Maximum characters of input text echoed into logs.
const LOG_PREVIEW_LEN: usize = 200;

/// OpenAI embedding service. Holds the async-openai client and model name.
#[derive(Debug, Clone)]
pub struct OpenAIEmbedding {
    client: Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIEmbedding {
    /// Creates a new OpenAI embedding service.
    ///
    /// If `api_key` is empty, falls back to the OPENAI_API_KEY environment
    /// variable.
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_base_url(api_key, model, None)
    }

    /// Creates a service pointed at an OpenAI-compatible endpoint when
    /// `base_url` is set.
    pub fn new_with_base_url(api_key: String, model: String, base_url: Option<&str>) -> Self {
        let api_key = if api_key.is_empty() {
            std::env::var("OPENAI_API_KEY").unwrap_or_default()
        } else {
            api_key
        };

        let mut openai_config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url.filter(|s| !s.is_empty()) {
            openai_config = openai_config.with_api_base(url);
        }
        let client = Client::with_config(openai_config);

        Self { client, model }
    }

    /// Creates a service with the default model (`text-embedding-3-small`).
    pub fn with_api_key(api_key: String) -> Self {
        Self::new(api_key, "text-embedding-3-small".to_string())
    }

    /// Sets a different embedding model.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Returns the embedding model name (for tests and diagnostics).
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Truncates text to a char-boundary-safe preview for logging.
fn preview(text: &str) -> String {
    if text.len() <= LOG_PREVIEW_LEN {
        text.to_string()
    } else {
        let safe_len = text
            .char_indices()
            .nth(LOG_PREVIEW_LEN)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        format!("{}...", &text[..safe_len])
    }
}

#[async_trait]
impl EmbeddingService for OpenAIEmbedding {
    /// Embeds a single text. Fails if the API is unreachable, the key is
    /// invalid, the request times out, or the response carries no embedding.
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        info!(
            model = %self.model,
            text_preview = %preview(text),
            text_len = text.len(),
            "step: embedding OpenAI embed request"
        );

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(vec![text])
            .build()?;

        let embeddings = self.client.embeddings();
        let create_future = embeddings.create(request);
        let response = match tokio::time::timeout(EMBED_TIMEOUT, create_future).await {
            Ok(Ok(r)) => {
                debug!("OpenAI embed response received");
                r
            }
            Ok(Err(e)) => {
                warn!(error = %e, "OpenAI embed request failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    timeout_secs = EMBED_TIMEOUT.as_secs(),
                    "OpenAI embed request timed out"
                );
                return Err(anyhow::anyhow!(
                    "OpenAI embed request timed out after {} seconds",
                    EMBED_TIMEOUT.as_secs()
                ));
            }
        };

        let embedding = match response.data.first() {
            Some(item) => item.embedding.clone(),
            None => {
                warn!("OpenAI embed response has no embedding data");
                return Err(anyhow::anyhow!("No embedding in response"));
            }
        };

        info!(
            dimension = embedding.len(),
            "step: embedding OpenAI embed done"
        );
        Ok(embedding)
    }

    /// Embeds multiple texts with a single API request. Output order matches
    /// input order; a count mismatch from the API is an error.
    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            debug!("OpenAI embed_batch empty input, skipping");
            return Ok(vec![]);
        }

        info!(
            model = %self.model,
            batch_size = texts.len(),
            "step: embedding OpenAI embed_batch request"
        );

        let inputs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(inputs)
            .build()?;

        let embeddings = self.client.embeddings();
        let create_future = embeddings.create(request);
        let response = match tokio::time::timeout(EMBED_BATCH_TIMEOUT, create_future).await {
            Ok(Ok(r)) => {
                debug!("OpenAI embed_batch response received");
                r
            }
            Ok(Err(e)) => {
                warn!(error = %e, "OpenAI embed_batch request failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    timeout_secs = EMBED_BATCH_TIMEOUT.as_secs(),
                    "OpenAI embed_batch request timed out"
                );
                return Err(anyhow::anyhow!(
                    "OpenAI embed_batch request timed out after {} seconds",
                    EMBED_BATCH_TIMEOUT.as_secs()
                ));
            }
        };

        let embeddings: Vec<Vec<f32>> = response
            .data
            .into_iter()
            .map(|item| item.embedding)
            .collect();

        if embeddings.len() != texts.len() {
            warn!(
                expected = texts.len(),
                got = embeddings.len(),
                "OpenAI embed_batch response count mismatch"
            );
            return Err(anyhow::anyhow!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            ));
        }

        let dimension = embeddings.first().map(|v| v.len()).unwrap_or(0);
        info!(
            count = embeddings.len(),
            dimension = dimension,
            "step: embedding OpenAI embed_batch done"
        );
        Ok(embeddings)
    }
}

// Live-API tests live in tests/openai_embedding_test.rs
