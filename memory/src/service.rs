//! Memory lifecycle and ranked retrieval.
//!
//! `MemoryService` owns create/search/feedback/usage/prune on top of a
//! `MemoryRepository` and an `EmbeddingService`. Embedding failures degrade
//! (memories stored without a vector, searches fall back to importance
//! ranking) rather than failing the operation.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Duration, Utc};
use embedding::{cosine_similarity, EmbeddingError, EmbeddingService};
use memory_core::{
    FeedbackOutcome, Memory, MemoryError, MemoryHit, MemoryRepository, MemorySearch, NewMemory,
    DEFAULT_IMPORTANCE,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Importance gained per positive feedback event.
pub const POSITIVE_FEEDBACK_STEP: f32 = 0.05;
/// Importance lost per negative feedback event. Twice the positive step:
/// bad guidance must disappear faster than good guidance accumulates.
pub const NEGATIVE_FEEDBACK_STEP: f32 = 0.10;

/// Maximum characters kept when deriving a summary from content.
const SUMMARY_MAX_CHARS: usize = 100;

// Relevance weights. Similarity dominates only when a query is present;
// otherwise importance does, and pinning is the strongest remaining signal.
const QUERY_SIMILARITY_WEIGHT: f32 = 0.5;
const QUERY_IMPORTANCE_WEIGHT: f32 = 0.3;
const QUERY_PINNED_BOOST: f32 = 0.3;
const NO_QUERY_IMPORTANCE_WEIGHT: f32 = 0.7;
const NO_QUERY_PINNED_BOOST: f32 = 0.5;
const USAGE_BOOST_CAP: f32 = 0.2;
const USAGE_BOOST_DIVISOR: f32 = 100.0;

// Low-value prune sweep thresholds.
const PRUNE_IMPORTANCE_FLOOR: f32 = 0.2;
const PRUNE_USAGE_FLOOR: u32 = 3;
const PRUNE_AGE_DAYS: i64 = 30;

/// Owner-scoped memory operations over a repository and embedding service.
pub struct MemoryService {
    repository: Arc<dyn MemoryRepository>,
    embedding: Arc<dyn EmbeddingService>,
}

impl MemoryService {
    pub fn new(
        repository: Arc<dyn MemoryRepository>,
        embedding: Arc<dyn EmbeddingService>,
    ) -> Self {
        Self {
            repository,
            embedding,
        }
    }

    /// Creates a memory. The content is embedded for similarity search; if
    /// the provider is unavailable the memory is stored without an embedding
    /// (searchable by filters, excluded from the similarity path).
    #[instrument(skip(self, new), fields(owner_id = %new.owner_id, category = %new.category))]
    pub async fn create(&self, new: NewMemory) -> Result<Memory, MemoryError> {
        if new.owner_id.trim().is_empty() {
            return Err(MemoryError::Validation("owner_id must not be empty".into()));
        }
        if new.content.trim().is_empty() {
            return Err(MemoryError::Validation("content must not be empty".into()));
        }
        if let Some(importance) = new.importance {
            validate_unit_range("importance", importance)?;
        }

        let embedding = match self.embedding.embed(&new.content).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(error = %e, "embedding failed, storing memory without vector");
                None
            }
        };

        let summary = new
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| derive_summary(&new.content));

        let memory = Memory {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            content: new.content,
            summary,
            category: new.category,
            source: new.source,
            embedding,
            importance: new.importance.unwrap_or(DEFAULT_IMPORTANCE),
            usage_count: 0,
            last_used_at: None,
            tags: new.tags,
            related_platform: new.related_platform,
            related_task_type: new.related_task_type,
            expires_at: new.expires_at,
            is_active: true,
            is_pinned: new.pinned,
            positive_feedback_count: 0,
            negative_feedback_count: 0,
            effectiveness_score: None,
            created_at: Utc::now(),
        };

        self.repository.insert(memory.clone()).await?;
        debug!(memory_id = %memory.id, has_embedding = memory.embedding.is_some(), "memory created");
        Ok(memory)
    }

    /// Ranked search over an owner's memories.
    ///
    /// With a query: `relevance = similarity*0.5 + importance*0.3 +
    /// usage_boost + 0.3 if pinned`; memories without an embedding are
    /// excluded, and memories whose embedding has an incompatible dimension
    /// are skipped with a warning (one bad vector never fails the search).
    /// Without a query (or when the query embedding fails): `relevance =
    /// importance*0.7 + usage_boost + 0.5 if pinned`.
    #[instrument(skip(self, search), fields(owner_id = %search.owner_id, limit = search.limit))]
    pub async fn search(&self, search: MemorySearch) -> Result<Vec<MemoryHit>, MemoryError> {
        if search.limit == 0 {
            return Err(MemoryError::Validation("limit must be at least 1".into()));
        }
        if let Some(min_importance) = search.min_importance {
            validate_unit_range("min_importance", min_importance)?;
        }

        let now = Utc::now();
        let candidates: Vec<Memory> = self
            .repository
            .list_by_owner(&search.owner_id)
            .await?
            .into_iter()
            .filter(|m| {
                if !search.include_inactive && (!m.is_active || m.is_expired(now)) {
                    return false;
                }
                if search.category.is_some_and(|c| m.category != c) {
                    return false;
                }
                if search.platform.is_some_and(|p| m.related_platform != Some(p)) {
                    return false;
                }
                if search
                    .task_type
                    .is_some_and(|t| m.related_task_type != Some(t))
                {
                    return false;
                }
                if search.min_importance.is_some_and(|min| m.importance < min) {
                    return false;
                }
                true
            })
            .collect();

        let query_embedding = match search
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
        {
            Some(query) => match self.embedding.embed(query).await {
                Ok(vector) => Some(vector),
                Err(e) => {
                    warn!(error = %e, "query embedding failed, falling back to importance ranking");
                    None
                }
            },
            None => None,
        };

        let mut hits: Vec<MemoryHit> = Vec::with_capacity(candidates.len());
        match &query_embedding {
            Some(query_vector) => {
                for memory in candidates {
                    let Some(vector) = memory.embedding.as_ref() else {
                        continue;
                    };
                    let similarity = match cosine_similarity(query_vector, vector) {
                        Ok(s) => s,
                        Err(EmbeddingError::DimensionMismatch { expected, actual }) => {
                            warn!(
                                memory_id = %memory.id,
                                expected,
                                actual,
                                "skipping memory with incompatible embedding"
                            );
                            continue;
                        }
                    };
                    let relevance = similarity * QUERY_SIMILARITY_WEIGHT
                        + memory.importance * QUERY_IMPORTANCE_WEIGHT
                        + usage_boost(&memory)
                        + if memory.is_pinned { QUERY_PINNED_BOOST } else { 0.0 };
                    hits.push(MemoryHit {
                        memory,
                        relevance,
                        similarity: Some(similarity),
                    });
                }
            }
            None => {
                for memory in candidates {
                    let relevance = memory.importance * NO_QUERY_IMPORTANCE_WEIGHT
                        + usage_boost(&memory)
                        + if memory.is_pinned {
                            NO_QUERY_PINNED_BOOST
                        } else {
                            0.0
                        };
                    hits.push(MemoryHit {
                        memory,
                        relevance,
                        similarity: None,
                    });
                }
            }
        }

        hits.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        });
        hits.truncate(search.limit);

        debug!(hit_count = hits.len(), queried = query_embedding.is_some(), "search finished");
        Ok(hits)
    }

    /// Returns the owner's active pinned memories, ordered by importance
    /// descending. No ranking, no budget: guaranteed-include content.
    pub async fn get_pinned(&self, owner_id: &str) -> Result<Vec<Memory>, MemoryError> {
        let mut pinned: Vec<Memory> = self
            .repository
            .list_by_owner(owner_id)
            .await?
            .into_iter()
            .filter(|m| m.is_active && m.is_pinned)
            .collect();
        pinned.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(Ordering::Equal)
        });
        Ok(pinned)
    }

    /// Retrieves one memory, owner-checked.
    pub async fn get(&self, owner_id: &str, id: Uuid) -> Result<Memory, MemoryError> {
        self.get_owned(owner_id, id).await
    }

    /// Hard-deletes a memory, owner-checked. Only reachable by explicit
    /// owner request; the usual end of life is soft deactivation.
    pub async fn delete(&self, owner_id: &str, id: Uuid) -> Result<(), MemoryError> {
        let memory = self.get_owned(owner_id, id).await?;
        self.repository.delete(memory.id).await?;
        info!(memory_id = %id, "memory hard-deleted");
        Ok(())
    }

    /// Soft-deactivates a memory, owner-checked. Terminal: there is no
    /// transition back to active.
    pub async fn deactivate(&self, owner_id: &str, id: Uuid) -> Result<Memory, MemoryError> {
        let mut memory = self.get_owned(owner_id, id).await?;
        memory.is_active = false;
        self.repository.update(memory.clone()).await?;
        Ok(memory)
    }

    /// Records that a memory was used in assembled context. Telemetry, not a
    /// correctness-critical write; callers treat failures as log-and-continue.
    pub async fn record_usage(&self, id: Uuid) -> Result<(), MemoryError> {
        let mut memory = self
            .repository
            .get(id)
            .await?
            .ok_or(MemoryError::NotFound(id))?;
        memory.usage_count += 1;
        memory.last_used_at = Some(Utc::now());
        self.repository.update(memory).await?;
        Ok(())
    }

    /// Applies a feedback event: +0.05 importance on positive, −0.10 on
    /// negative (clamped to [0, 1]), then recomputes the effectiveness score.
    #[instrument(skip(self), fields(memory_id = %id))]
    pub async fn apply_feedback(
        &self,
        owner_id: &str,
        id: Uuid,
        outcome: FeedbackOutcome,
    ) -> Result<Memory, MemoryError> {
        let mut memory = self.get_owned(owner_id, id).await?;

        match outcome {
            FeedbackOutcome::Positive => {
                memory.importance = (memory.importance + POSITIVE_FEEDBACK_STEP).min(1.0);
                memory.positive_feedback_count += 1;
            }
            FeedbackOutcome::Negative => {
                memory.importance = (memory.importance - NEGATIVE_FEEDBACK_STEP).max(0.0);
                memory.negative_feedback_count += 1;
            }
        }

        let total = memory.positive_feedback_count + memory.negative_feedback_count;
        memory.effectiveness_score = Some(memory.positive_feedback_count as f32 / total as f32);

        self.repository.update(memory.clone()).await?;
        debug!(
            importance = memory.importance,
            effectiveness = ?memory.effectiveness_score,
            "feedback applied"
        );
        Ok(memory)
    }

    /// Maintenance sweep: deactivates (a) expired memories and (b) low-value
    /// memories (importance < 0.2, used < 3 times, older than 30 days).
    /// Pinned memories are immune. Returns the number deactivated.
    /// Idempotent; explicit operation, never run automatically.
    #[instrument(skip(self))]
    pub async fn prune(&self, owner_id: &str) -> Result<usize, MemoryError> {
        let now = Utc::now();
        let age_cutoff = now - Duration::days(PRUNE_AGE_DAYS);
        let mut deactivated = 0;

        for mut memory in self.repository.list_by_owner(owner_id).await? {
            if !memory.is_active || memory.is_pinned {
                continue;
            }
            let expired = memory.is_expired(now);
            let low_value = memory.importance < PRUNE_IMPORTANCE_FLOOR
                && memory.usage_count < PRUNE_USAGE_FLOOR
                && memory.created_at < age_cutoff;
            if expired || low_value {
                memory.is_active = false;
                self.repository.update(memory).await?;
                deactivated += 1;
            }
        }

        info!(owner_id, deactivated, "prune sweep finished");
        Ok(deactivated)
    }

    async fn get_owned(&self, owner_id: &str, id: Uuid) -> Result<Memory, MemoryError> {
        match self.repository.get(id).await? {
            Some(memory) if memory.owner_id == owner_id => Ok(memory),
            // A foreign owner's memory looks exactly like a missing one.
            _ => Err(MemoryError::NotFound(id)),
        }
    }
}

/// Usage signal: min(usage_count/100, 0.2).
fn usage_boost(memory: &Memory) -> f32 {
    (memory.usage_count as f32 / USAGE_BOOST_DIVISOR).min(USAGE_BOOST_CAP)
}

/// Derives a summary from content: char-boundary-safe truncation to 100
/// characters with an ellipsis marker.
fn derive_summary(content: &str) -> String {
    if content.chars().count() <= SUMMARY_MAX_CHARS {
        return content.to_string();
    }
    let truncated: String = content.chars().take(SUMMARY_MAX_CHARS).collect();
    format!("{truncated}...")
}

fn validate_unit_range(field: &str, value: f32) -> Result<(), MemoryError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(MemoryError::Validation(format!(
            "{field} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory_repository::InMemoryRepository;
    use async_trait::async_trait;
    use memory_core::{MemoryCategory, MemorySource};
    use std::collections::{BTreeSet, HashMap};

    /// Returns programmed vectors per text, or a fixed default.
    struct StubEmbedding {
        vectors: HashMap<String, Vec<f32>>,
        default: Vec<f32>,
    }

    impl StubEmbedding {
        fn uniform() -> Self {
            Self {
                vectors: HashMap::new(),
                default: vec![1.0, 0.0, 0.0],
            }
        }

        fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
            self.vectors.insert(text.to_string(), vector);
            self
        }
    }

    #[async_trait]
    impl EmbeddingService for StubEmbedding {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| self.default.clone()))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }
    }

    struct FailingEmbedding;

    #[async_trait]
    impl EmbeddingService for FailingEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
            Err(anyhow::anyhow!("provider unreachable"))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
            Err(anyhow::anyhow!("provider unreachable"))
        }
    }

    fn service_with(embedding: Arc<dyn EmbeddingService>) -> (MemoryService, Arc<InMemoryRepository>) {
        let repository = Arc::new(InMemoryRepository::new());
        (
            MemoryService::new(repository.clone(), embedding),
            repository,
        )
    }

    fn service() -> (MemoryService, Arc<InMemoryRepository>) {
        service_with(Arc::new(StubEmbedding::uniform()))
    }

    fn raw_memory(owner_id: &str, content: &str) -> Memory {
        Memory {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            content: content.to_string(),
            summary: content.to_string(),
            category: MemoryCategory::General,
            source: MemorySource::DirectInput,
            embedding: Some(vec![1.0, 0.0, 0.0]),
            importance: 0.5,
            usage_count: 0,
            last_used_at: None,
            tags: BTreeSet::new(),
            related_platform: None,
            related_task_type: None,
            expires_at: None,
            is_active: true,
            is_pinned: false,
            positive_feedback_count: 0,
            negative_feedback_count: 0,
            effectiveness_score: None,
            created_at: Utc::now(),
        }
    }

    fn new_memory(owner_id: &str, content: &str) -> NewMemory {
        NewMemory::new(
            owner_id,
            content,
            MemoryCategory::Preference,
            MemorySource::DirectInput,
        )
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let (service, _) = service();
        let memory = service
            .create(new_memory("owner-1", "Prefers a playful tone"))
            .await
            .unwrap();

        assert_eq!(memory.importance, 0.5);
        assert_eq!(memory.summary, "Prefers a playful tone");
        assert!(memory.embedding.is_some());
        assert!(memory.is_active);
        assert!(!memory.is_pinned);
        assert!(memory.effectiveness_score.is_none());
    }

    #[tokio::test]
    async fn test_create_derives_truncated_summary() {
        let (service, _) = service();
        let long_content = "x".repeat(250);
        let memory = service
            .create(new_memory("owner-1", &long_content))
            .await
            .unwrap();

        assert_eq!(memory.summary.chars().count(), 103); // 100 chars + "..."
        assert!(memory.summary.ends_with("..."));
    }

    #[tokio::test]
    async fn test_create_survives_embedding_failure() {
        let (service, _) = service_with(Arc::new(FailingEmbedding));
        let memory = service
            .create(new_memory("owner-1", "Still worth storing"))
            .await
            .unwrap();

        assert!(memory.embedding.is_none());
        assert!(memory.is_active);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content() {
        let (service, _) = service();
        let err = service.create(new_memory("owner-1", "   ")).await.unwrap_err();
        assert!(matches!(err, MemoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_importance() {
        let (service, _) = service();
        let err = service
            .create(new_memory("owner-1", "fact").with_importance(1.5))
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_positive_feedback_step_and_clamp() {
        let (service, _) = service();
        let memory = service
            .create(new_memory("owner-1", "fact").with_importance(0.98))
            .await
            .unwrap();

        let updated = service
            .apply_feedback("owner-1", memory.id, FeedbackOutcome::Positive)
            .await
            .unwrap();
        assert_eq!(updated.importance, 1.0); // 0.98 + 0.05 clamps at 1.0
        assert_eq!(updated.positive_feedback_count, 1);
        assert_eq!(updated.effectiveness_score, Some(1.0));
    }

    #[tokio::test]
    async fn test_negative_feedback_step_and_clamp() {
        let (service, _) = service();
        let memory = service
            .create(new_memory("owner-1", "fact").with_importance(0.05))
            .await
            .unwrap();

        let updated = service
            .apply_feedback("owner-1", memory.id, FeedbackOutcome::Negative)
            .await
            .unwrap();
        assert_eq!(updated.importance, 0.0); // 0.05 - 0.10 clamps at 0.0
        assert_eq!(updated.negative_feedback_count, 1);
        assert_eq!(updated.effectiveness_score, Some(0.0));
    }

    #[tokio::test]
    async fn test_effectiveness_recomputed_each_event() {
        let (service, _) = service();
        let memory = service.create(new_memory("owner-1", "fact")).await.unwrap();

        service
            .apply_feedback("owner-1", memory.id, FeedbackOutcome::Positive)
            .await
            .unwrap();
        service
            .apply_feedback("owner-1", memory.id, FeedbackOutcome::Positive)
            .await
            .unwrap();
        let updated = service
            .apply_feedback("owner-1", memory.id, FeedbackOutcome::Negative)
            .await
            .unwrap();

        assert_eq!(updated.positive_feedback_count, 2);
        assert_eq!(updated.negative_feedback_count, 1);
        let effectiveness = updated.effectiveness_score.unwrap();
        assert!((effectiveness - 2.0 / 3.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_feedback_on_foreign_memory_is_not_found() {
        let (service, _) = service();
        let memory = service.create(new_memory("owner-1", "fact")).await.unwrap();

        let err = service
            .apply_feedback("owner-2", memory.id, FeedbackOutcome::Positive)
            .await
            .unwrap_err();
        assert!(matches!(err, MemoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_no_query_ranking_crossover() {
        // Pinned importance 0.1 scores 0.1*0.7 + 0.5 = 0.57; unpinned
        // importance 0.9 scores 0.63. The boost does not guarantee first
        // place — verify the arithmetic, not the intuition.
        let (service, repository) = service();
        let mut pinned = raw_memory("owner-1", "pinned but weak");
        pinned.is_pinned = true;
        pinned.importance = 0.1;
        let mut strong = raw_memory("owner-1", "unpinned but strong");
        strong.importance = 0.9;
        repository.insert(pinned).await.unwrap();
        repository.insert(strong).await.unwrap();

        let hits = service
            .search(MemorySearch::new("owner-1"))
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].memory.content, "unpinned but strong");
        assert!((hits[0].relevance - 0.63).abs() < 1e-6);
        assert!((hits[1].relevance - 0.57).abs() < 1e-6);
        assert!(hits[0].similarity.is_none());
    }

    #[tokio::test]
    async fn test_no_query_pin_wins_at_equal_importance() {
        let (service, repository) = service();
        let mut pinned = raw_memory("owner-1", "pinned");
        pinned.is_pinned = true;
        let unpinned = raw_memory("owner-1", "unpinned");
        repository.insert(pinned).await.unwrap();
        repository.insert(unpinned).await.unwrap();

        let hits = service.search(MemorySearch::new("owner-1")).await.unwrap();
        assert_eq!(hits[0].memory.content, "pinned");
    }

    #[tokio::test]
    async fn test_query_ranking_follows_similarity() {
        let embedding = StubEmbedding::uniform().with_vector("the query", vec![1.0, 0.0, 0.0]);
        let (service, repository) = service_with(Arc::new(embedding));

        let mut aligned = raw_memory("owner-1", "aligned");
        aligned.embedding = Some(vec![1.0, 0.0, 0.0]);
        let mut orthogonal = raw_memory("owner-1", "orthogonal");
        orthogonal.embedding = Some(vec![0.0, 1.0, 0.0]);
        repository.insert(aligned).await.unwrap();
        repository.insert(orthogonal).await.unwrap();

        let hits = service
            .search(MemorySearch::new("owner-1").with_query("the query"))
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].memory.content, "aligned");
        assert_eq!(hits[0].similarity, Some(1.0));
        // similarity 1.0 * 0.5 + importance 0.5 * 0.3 = 0.65
        assert!((hits[0].relevance - 0.65).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_query_path_excludes_unembedded_memories() {
        let (service, repository) = service();
        let mut no_vector = raw_memory("owner-1", "no vector");
        no_vector.embedding = None;
        repository.insert(no_vector).await.unwrap();
        repository.insert(raw_memory("owner-1", "has vector")).await.unwrap();

        let hits = service
            .search(MemorySearch::new("owner-1").with_query("anything"))
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].memory.content, "has vector");
    }

    #[tokio::test]
    async fn test_query_path_skips_dimension_mismatch() {
        let (service, repository) = service();
        let mut incompatible = raw_memory("owner-1", "old model vector");
        incompatible.embedding = Some(vec![1.0, 0.0]); // wrong dimension
        repository.insert(incompatible).await.unwrap();
        repository.insert(raw_memory("owner-1", "compatible")).await.unwrap();

        let hits = service
            .search(MemorySearch::new("owner-1").with_query("anything"))
            .await
            .unwrap();

        // One bad vector is skipped, not fatal to the whole search.
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].memory.content, "compatible");
    }

    #[tokio::test]
    async fn test_query_embedding_failure_degrades_to_importance() {
        let (service, repository) = service_with(Arc::new(FailingEmbedding));
        repository.insert(raw_memory("owner-1", "fact")).await.unwrap();

        let hits = service
            .search(MemorySearch::new("owner-1").with_query("anything"))
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert!(hits[0].similarity.is_none());
    }

    #[tokio::test]
    async fn test_search_excludes_inactive_and_expired() {
        let (service, repository) = service();
        let mut inactive = raw_memory("owner-1", "inactive");
        inactive.is_active = false;
        let mut expired = raw_memory("owner-1", "expired");
        expired.expires_at = Some(Utc::now() - Duration::hours(1));
        repository.insert(inactive).await.unwrap();
        repository.insert(expired).await.unwrap();
        repository.insert(raw_memory("owner-1", "live")).await.unwrap();

        let hits = service.search(MemorySearch::new("owner-1")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].memory.content, "live");

        let all = service
            .search(MemorySearch::new("owner-1").include_inactive())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_search_filters_and_limit() {
        let (service, repository) = service();
        for i in 0..5 {
            let mut m = raw_memory("owner-1", &format!("fact {i}"));
            m.category = MemoryCategory::Style;
            m.importance = 0.1 * (i as f32 + 1.0);
            repository.insert(m).await.unwrap();
        }
        let mut other = raw_memory("owner-1", "other category");
        other.category = MemoryCategory::Audience;
        repository.insert(other).await.unwrap();

        let hits = service
            .search(
                MemorySearch::new("owner-1")
                    .with_category(MemoryCategory::Style)
                    .with_min_importance(0.2)
                    .with_limit(2),
            )
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.memory.category == MemoryCategory::Style));
        // Highest importance first on the no-query path.
        assert!(hits[0].memory.importance >= hits[1].memory.importance);
    }

    #[tokio::test]
    async fn test_search_is_owner_scoped() {
        let (service, repository) = service();
        repository.insert(raw_memory("owner-1", "mine")).await.unwrap();
        repository.insert(raw_memory("owner-2", "theirs")).await.unwrap();

        let hits = service.search(MemorySearch::new("owner-1")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].memory.content, "mine");
    }

    #[tokio::test]
    async fn test_pinned_round_trip() {
        let (service, _) = service();
        let memory = service
            .create(new_memory("owner-1", "always include").pinned())
            .await
            .unwrap();

        let pinned = service.get_pinned("owner-1").await.unwrap();
        assert_eq!(pinned.len(), 1);
        assert_eq!(pinned[0].id, memory.id);

        service.deactivate("owner-1", memory.id).await.unwrap();
        assert!(service.get_pinned("owner-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_pinned_ordered_by_importance() {
        let (service, repository) = service();
        for (content, importance) in [("low", 0.2), ("high", 0.9), ("mid", 0.5)] {
            let mut m = raw_memory("owner-1", content);
            m.is_pinned = true;
            m.importance = importance;
            repository.insert(m).await.unwrap();
        }

        let pinned = service.get_pinned("owner-1").await.unwrap();
        let order: Vec<&str> = pinned.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn test_record_usage() {
        let (service, repository) = service();
        let memory = service.create(new_memory("owner-1", "fact")).await.unwrap();

        service.record_usage(memory.id).await.unwrap();
        service.record_usage(memory.id).await.unwrap();

        let stored = repository.get(memory.id).await.unwrap().unwrap();
        assert_eq!(stored.usage_count, 2);
        assert!(stored.last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_prune_deactivates_expired() {
        let (service, repository) = service();
        let mut expired = raw_memory("owner-1", "expired");
        expired.expires_at = Some(Utc::now() - Duration::hours(1));
        repository.insert(expired.clone()).await.unwrap();
        repository.insert(raw_memory("owner-1", "live")).await.unwrap();

        let count = service.prune("owner-1").await.unwrap();
        assert_eq!(count, 1);
        assert!(!repository.get(expired.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_prune_deactivates_old_low_value() {
        let (service, repository) = service();
        let mut stale = raw_memory("owner-1", "stale");
        stale.importance = 0.1;
        stale.usage_count = 1;
        stale.created_at = Utc::now() - Duration::days(40);
        repository.insert(stale.clone()).await.unwrap();

        // Same profile but too recent: must survive.
        let mut recent = raw_memory("owner-1", "recent");
        recent.importance = 0.1;
        recent.usage_count = 1;
        repository.insert(recent.clone()).await.unwrap();

        // Low importance but well used: must survive.
        let mut used = raw_memory("owner-1", "used");
        used.importance = 0.1;
        used.usage_count = 10;
        used.created_at = Utc::now() - Duration::days(40);
        repository.insert(used.clone()).await.unwrap();

        let count = service.prune("owner-1").await.unwrap();
        assert_eq!(count, 1);
        assert!(!repository.get(stale.id).await.unwrap().unwrap().is_active);
        assert!(repository.get(recent.id).await.unwrap().unwrap().is_active);
        assert!(repository.get(used.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_prune_never_touches_pinned() {
        let (service, repository) = service();
        let mut pinned = raw_memory("owner-1", "pinned");
        pinned.is_pinned = true;
        pinned.importance = 0.0;
        pinned.usage_count = 0;
        pinned.created_at = Utc::now() - Duration::days(400);
        pinned.expires_at = Some(Utc::now() - Duration::days(1));
        repository.insert(pinned.clone()).await.unwrap();

        let count = service.prune("owner-1").await.unwrap();
        assert_eq!(count, 0);
        assert!(repository.get(pinned.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_prune_is_idempotent() {
        let (service, repository) = service();
        let mut expired = raw_memory("owner-1", "expired");
        expired.expires_at = Some(Utc::now() - Duration::hours(1));
        repository.insert(expired).await.unwrap();

        assert_eq!(service.prune("owner-1").await.unwrap(), 1);
        assert_eq!(service.prune("owner-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_owner_checked() {
        let (service, repository) = service();
        let memory = service.create(new_memory("owner-1", "fact")).await.unwrap();

        let err = service.delete("owner-2", memory.id).await.unwrap_err();
        assert!(matches!(err, MemoryError::NotFound(_)));
        assert!(repository.get(memory.id).await.unwrap().is_some());

        service.delete("owner-1", memory.id).await.unwrap();
        assert!(repository.get(memory.id).await.unwrap().is_none());
    }
}
