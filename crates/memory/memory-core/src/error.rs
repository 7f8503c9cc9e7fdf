//! Error taxonomy for memory operations.
//!
//! Embedding failures are recoverable (memories degrade to embedding-less,
//! context builds proceed without query ranking); `NotFound` and `Validation`
//! surface to the caller; storage errors are wrapped as-is.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the memory service and context assembler.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The external embedding model is unreachable or misconfigured.
    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// No memory with this id exists for the requesting owner.
    #[error("memory {0} not found")]
    NotFound(Uuid),

    /// Embedding vectors from incompatible models were compared.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A request field failed validation before any store access.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The underlying record store failed.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
