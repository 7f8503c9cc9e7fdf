//! # Memory Crate
//!
//! The `memory` crate turns a growing collection of free-text memories about a
//! business into a small, token-bounded context string for steering a
//! generative model.
//!
//! ## Components
//!
//! - [`service`] - `MemoryService`: create, ranked semantic search,
//!   feedback-driven re-ranking, usage telemetry, pruning
//! - [`inmemory_repository`] - reference `MemoryRepository` backend
//! - [`context`] - `ContextAssembler`: greedy three-tier budget packing
//!
//! ## External Interactions
//!
//! - **Embedding services**: via the `embedding` crate trait, wrapped in the
//!   bounded cache
//! - **Snapshot providers**: read-only profile/platform/template snapshots
//!   (`memory-core` traits); their lifecycle is owned elsewhere
//! - **Storage backends**: any `MemoryRepository` implementation

pub mod context;
pub mod inmemory_repository;
pub mod service;

pub use context::{
    estimate_tokens, ContextAssembler, ContextMetadata, ContextRequest, ContextResult,
    DEFAULT_MAX_TOKENS,
};
pub use inmemory_repository::InMemoryRepository;
pub use memory_core::*;
pub use service::MemoryService;
