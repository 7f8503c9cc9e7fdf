//! # Memory Core
//!
//! Core types and traits for the semantic memory engine.
//! Used by the `memory` crate and any storage backend.
//!
//! ## Modules
//!
//! - [`types`] - Memory, closed-set enums, search/feedback types
//! - [`error`] - MemoryError taxonomy
//! - [`repository`] - MemoryRepository trait (external keyed record store)
//! - [`snapshot`] - Read-only profile/platform/template snapshots and providers

pub mod error;
pub mod repository;
pub mod snapshot;
pub mod types;

pub use error::*;
pub use repository::*;
pub use snapshot::*;
pub use types::*;
