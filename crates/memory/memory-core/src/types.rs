//! Core types: owner-scoped memories and the closed sets they are tagged with.
//!
//! Category, source, task type and platform are proper enums; unknown string
//! values are rejected at the boundary with a validation error rather than
//! silently defaulting.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MemoryError;

/// Default importance assigned to a memory when none is supplied.
pub const DEFAULT_IMPORTANCE: f32 = 0.5;

/// Default number of results returned by a search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// What kind of fact a memory captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Preference,
    Style,
    Audience,
    Performance,
    Correction,
    General,
}

impl MemoryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preference => "preference",
            Self::Style => "style",
            Self::Audience => "audience",
            Self::Performance => "performance",
            Self::Correction => "correction",
            Self::General => "general",
        }
    }
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryCategory {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preference" => Ok(Self::Preference),
            "style" => Ok(Self::Style),
            "audience" => Ok(Self::Audience),
            "performance" => Ok(Self::Performance),
            "correction" => Ok(Self::Correction),
            "general" => Ok(Self::General),
            other => Err(MemoryError::Validation(format!(
                "unknown memory category: {other:?}"
            ))),
        }
    }
}

/// Where a memory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    ExplicitFeedback,
    EditCorrection,
    PerformanceData,
    DirectInput,
    AutoLearned,
    System,
}

impl MemorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplicitFeedback => "explicit_feedback",
            Self::EditCorrection => "edit_correction",
            Self::PerformanceData => "performance_data",
            Self::DirectInput => "direct_input",
            Self::AutoLearned => "auto_learned",
            Self::System => "system",
        }
    }
}

impl fmt::Display for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemorySource {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explicit_feedback" => Ok(Self::ExplicitFeedback),
            "edit_correction" => Ok(Self::EditCorrection),
            "performance_data" => Ok(Self::PerformanceData),
            "direct_input" => Ok(Self::DirectInput),
            "auto_learned" => Ok(Self::AutoLearned),
            "system" => Ok(Self::System),
            other => Err(MemoryError::Validation(format!(
                "unknown memory source: {other:?}"
            ))),
        }
    }
}

/// The generation task a context is assembled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    PostGeneration,
    CaptionWriting,
    HashtagSuggestion,
    ContentIdeas,
    CommentReply,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostGeneration => "post_generation",
            Self::CaptionWriting => "caption_writing",
            Self::HashtagSuggestion => "hashtag_suggestion",
            Self::ContentIdeas => "content_ideas",
            Self::CommentReply => "comment_reply",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post_generation" => Ok(Self::PostGeneration),
            "caption_writing" => Ok(Self::CaptionWriting),
            "hashtag_suggestion" => Ok(Self::HashtagSuggestion),
            "content_ideas" => Ok(Self::ContentIdeas),
            "comment_reply" => Ok(Self::CommentReply),
            other => Err(MemoryError::Validation(format!(
                "unknown task type: {other:?}"
            ))),
        }
    }
}

/// Social platform a memory or request relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Facebook,
    X,
    #[serde(rename = "linkedin")]
    LinkedIn,
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "youtube")]
    YouTube,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::X => "x",
            Self::LinkedIn => "linkedin",
            Self::TikTok => "tiktok",
            Self::YouTube => "youtube",
        }
    }

    /// Human-readable name used in assembled context text.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::X => "X",
            Self::LinkedIn => "LinkedIn",
            Self::TikTok => "TikTok",
            Self::YouTube => "YouTube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instagram" => Ok(Self::Instagram),
            "facebook" => Ok(Self::Facebook),
            "x" => Ok(Self::X),
            "linkedin" => Ok(Self::LinkedIn),
            "tiktok" => Ok(Self::TikTok),
            "youtube" => Ok(Self::YouTube),
            other => Err(MemoryError::Validation(format!(
                "unknown platform: {other:?}"
            ))),
        }
    }
}

/// A stored, owner-scoped fact/preference/pattern used to steer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Unique identifier, owned by the store.
    pub id: Uuid,
    /// Owning user/tenant; every operation is scoped by it.
    pub owner_id: String,
    /// The fact itself.
    pub content: String,
    /// Shorter derived text (truncated from content when not supplied).
    pub summary: String,
    pub category: MemoryCategory,
    pub source: MemorySource,
    /// Absent when embedding failed at creation; such memories are excluded
    /// from similarity search but still retrievable by filter.
    pub embedding: Option<Vec<f32>>,
    /// In [0, 1]; moves only via explicit feedback.
    pub importance: f32,
    pub usage_count: u32,
    pub last_used_at: Option<DateTime<Utc>>,
    pub tags: BTreeSet<String>,
    pub related_platform: Option<Platform>,
    pub related_task_type: Option<TaskType>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Soft-delete flag; inactive memories never come back from search.
    pub is_active: bool,
    /// Pinned memories bypass ranking and are immune to pruning.
    pub is_pinned: bool,
    pub positive_feedback_count: u32,
    pub negative_feedback_count: u32,
    /// positive/(positive+negative); `None` until the first feedback event.
    pub effectiveness_score: Option<f32>,
    pub created_at: DateTime<Utc>,
}

impl Memory {
    /// Returns true if the memory carries an expiry in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}

/// Input for creating a memory. Unset optional fields take documented
/// defaults (importance 0.5, summary derived from content).
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub owner_id: String,
    pub content: String,
    pub summary: Option<String>,
    pub category: MemoryCategory,
    pub source: MemorySource,
    pub importance: Option<f32>,
    pub tags: BTreeSet<String>,
    pub related_platform: Option<Platform>,
    pub related_task_type: Option<TaskType>,
    pub pinned: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewMemory {
    pub fn new(
        owner_id: impl Into<String>,
        content: impl Into<String>,
        category: MemoryCategory,
        source: MemorySource,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            content: content.into(),
            summary: None,
            category,
            source,
            importance: None,
            tags: BTreeSet::new(),
            related_platform: None,
            related_task_type: None,
            pinned: false,
            expires_at: None,
        }
    }

    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.related_platform = Some(platform);
        self
    }

    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.related_task_type = Some(task_type);
        self
    }

    pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

/// Parameters for a ranked memory search. All filters are conjunctive.
#[derive(Debug, Clone)]
pub struct MemorySearch {
    pub owner_id: String,
    /// When set, relevance is dominated by vector similarity to this text.
    pub query: Option<String>,
    pub category: Option<MemoryCategory>,
    pub platform: Option<Platform>,
    pub task_type: Option<TaskType>,
    pub min_importance: Option<f32>,
    pub limit: usize,
    /// Also return inactive/expired memories (maintenance views).
    pub include_inactive: bool,
}

impl MemorySearch {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            query: None,
            category: None,
            platform: None,
            task_type: None,
            min_importance: None,
            limit: DEFAULT_SEARCH_LIMIT,
            include_inactive: false,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_category(mut self, category: MemoryCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    pub fn with_min_importance(mut self, min_importance: f32) -> Self {
        self.min_importance = Some(min_importance);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn include_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }
}

/// A ranked search result.
#[derive(Debug, Clone)]
pub struct MemoryHit {
    pub memory: Memory,
    /// Weighted combination of similarity, importance, usage and pinning.
    pub relevance: f32,
    /// Cosine similarity to the query; `None` on the no-query path.
    pub similarity: Option<f32>,
}

/// Outcome reported against a memory that was used in generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackOutcome {
    Positive,
    Negative,
}
