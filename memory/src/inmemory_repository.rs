//! # In-Memory Repository
//!
//! In-memory implementation of the `MemoryRepository` trait. Fastest backend,
//! no persistence; suited to tests, development, and single-process
//! deployments with small per-owner working sets (hundreds of memories).
//!
//! Thread safety comes from `Arc<RwLock<>>`; every method clones records out
//! so the store keeps sole ownership of its map.

use std::collections::HashMap;
use std::sync::Arc;

use memory_core::{Memory, MemoryRepository};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory memory record store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<RwLock<HashMap<Uuid, Memory>>>,
}

impl InMemoryRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of records in the store.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes all records. Irreversible; test isolation helper.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait::async_trait]
impl MemoryRepository for InMemoryRepository {
    async fn insert(&self, memory: Memory) -> Result<(), anyhow::Error> {
        let mut records = self.records.write().await;
        records.insert(memory.id, memory);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Memory>, anyhow::Error> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn update(&self, memory: Memory) -> Result<(), anyhow::Error> {
        let mut records = self.records.write().await;
        records.insert(memory.id, memory);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), anyhow::Error> {
        let mut records = self.records.write().await;
        records.remove(&id);
        Ok(())
    }

    /// Linear scan; acceptable for the expected per-owner working set.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Memory>, anyhow::Error> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
