//! Request and result types for context assembly.

use chrono::{DateTime, Utc};
use memory_core::{Platform, TaskType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token budget for an assembled context.
pub const DEFAULT_MAX_TOKENS: usize = 800;

/// A request to assemble context for one owner and task.
#[derive(Debug, Clone)]
pub struct ContextRequest {
    pub owner_id: String,
    pub task_type: TaskType,
    pub platform: Option<Platform>,
    /// Freeform text appended after the tiers if it fits the budget.
    pub extra: Option<String>,
    pub max_tokens: usize,
}

impl ContextRequest {
    pub fn new(owner_id: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            owner_id: owner_id.into(),
            task_type,
            platform: None,
            extra: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// The assembled context plus provenance for downstream feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextResult {
    pub context: String,
    pub tokens_used: usize,
    /// Memories included, for wiring feedback back to `apply_feedback`.
    pub memory_ids: Vec<Uuid>,
    pub template_ids: Vec<Uuid>,
    pub metadata: ContextMetadata,
}

impl ContextResult {
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }

    /// Returns true if the estimate came out over the given budget. The
    /// gated tiers never overshoot; only the ungated core tier can push a
    /// result past a budget smaller than the profile itself.
    pub fn exceeds_limit(&self, max_tokens: usize) -> bool {
        self.tokens_used > max_tokens
    }
}

/// What went into the context and how full each tier came out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMetadata {
    pub core_tier: bool,
    pub task_tier: bool,
    pub extended_tier: bool,
    pub profile_included: bool,
    pub platform_included: bool,
    pub pinned_count: usize,
    pub relevant_count: usize,
    pub built_at: DateTime<Utc>,
}
