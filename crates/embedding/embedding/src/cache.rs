//! Bounded embedding cache.
//!
//! Keyed by SHA-256 of the text content, so the same text never hits the
//! external embedding API twice while the entry is cached. Entries are
//! ephemeral and rebuildable; losing the cache costs latency, never
//! correctness.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

/// Derives the cache key for a text: hex-encoded SHA-256 of its bytes.
/// 256 bits makes accidental collisions practically negligible.
fn content_key(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

struct CacheInner {
    entries: HashMap<String, Vec<f32>>,
    /// Insertion order of keys, oldest at the front.
    order: VecDeque<String>,
}

/// Bounded concurrent map from text content to embedding vector.
///
/// Eviction is insertion-order (FIFO): when the bound is exceeded the
/// oldest-inserted entry is removed. A cache hit does NOT move an entry to
/// the back of the queue — this is deliberately not an LRU, kept for parity
/// with the behavior callers were tuned against.
///
/// The lock is only held for the brief get/insert/evict; callers embed
/// outside the lock so a slow external call never serializes unrelated
/// requests.
///
/// One cache instance is constructed per process and shared by handle
/// (`Clone` is cheap), rather than living in a global static, so tests can
/// build isolated instances.
#[derive(Clone)]
pub struct EmbeddingCache {
    capacity: usize,
    inner: Arc<RwLock<CacheInner>>,
}

impl EmbeddingCache {
    /// Creates a cache bounded to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Arc::new(RwLock::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    /// Returns the cached vector for `text`, if present.
    pub async fn get(&self, text: &str) -> Option<Vec<f32>> {
        let key = content_key(text);
        let inner = self.inner.read().await;
        inner.entries.get(&key).cloned()
    }

    /// Inserts a vector for `text`, evicting the oldest-inserted entry when
    /// the bound is exceeded. Re-inserting an existing key overwrites the
    /// vector without changing its eviction position.
    pub async fn insert(&self, text: &str, vector: Vec<f32>) {
        let key = content_key(text);
        let mut inner = self.inner.write().await;
        if inner.entries.insert(key.clone(), vector).is_none() {
            inner.order.push_back(key);
        }
        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    debug!(key = %oldest, "embedding cache evicted oldest entry");
                }
                None => break,
            }
        }
    }

    /// Returns the number of cached entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes all entries.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.order.clear();
    }
}
