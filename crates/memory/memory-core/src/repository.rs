//! # Memory Storage
//!
//! This module defines the storage interface for memory records.
//!
//! The `MemoryRepository` trait is implemented by storage backends; the
//! service layer treats it as an external keyed record store and owns all
//! ranking, feedback, and pruning logic on top of it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::Memory;

/// Trait for storing and retrieving memory records.
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    /// Inserts a new memory record.
    async fn insert(&self, memory: Memory) -> Result<(), anyhow::Error>;

    /// Retrieves a memory by id. Returns `None` if not found.
    async fn get(&self, id: Uuid) -> Result<Option<Memory>, anyhow::Error>;

    /// Replaces an existing memory record.
    async fn update(&self, memory: Memory) -> Result<(), anyhow::Error>;

    /// Hard-deletes a memory by id.
    async fn delete(&self, id: Uuid) -> Result<(), anyhow::Error>;

    /// Retrieves all memory records for an owner, active or not.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Memory>, anyhow::Error>;
}
