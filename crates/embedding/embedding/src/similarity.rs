//! Cosine similarity over embedding vectors.
//!
//! Vectors must come from the same embedding model; comparing vectors of
//! different dimensions is a `DimensionMismatch` error, not a silent 0.

use thiserror::Error;

/// Errors from embedding vector operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Two vectors of different lengths were compared (mixed embedding models).
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Calculates cosine similarity between two vectors.
///
/// Result is in [-1, 1] for non-degenerate input. Empty vectors and zero
/// vectors yield 0.0 (avoids division by zero).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (norm_a * norm_b))
}
