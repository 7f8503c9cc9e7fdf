//! Read-only snapshots consumed during context assembly.
//!
//! Profiles, platform statistics and templates are owned by external
//! collaborators; the engine only reads point-in-time copies of them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Platform, TaskType};

/// Point-in-time copy of a business profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub name: String,
    pub business_type: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub brand_voice_tone: Option<String>,
    pub target_audience: Option<String>,
    pub unique_selling_points: Vec<String>,
    pub brand_values: Vec<String>,
    pub highlighted_products: Vec<Product>,
    pub words_to_avoid: Vec<String>,
    pub words_to_emphasize: Vec<String>,
    pub brand_colors: Vec<String>,
}

/// A product surfaced in the extended context tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: Option<String>,
}

/// Point-in-time platform statistics for one owner and platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformStats {
    pub followers: u64,
    /// Engagement rate as a percentage (e.g. 4.2 for 4.2%).
    pub engagement_rate: f32,
    pub best_posting_times: Vec<String>,
    pub top_topics: Vec<String>,
}

/// A reusable content template applicable to a task type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub body: String,
    pub task_type: TaskType,
    pub priority: i32,
    pub effectiveness: Option<f32>,
}

/// Read-only access to business profiles.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Returns the owner's profile snapshot, or `None` if no profile exists.
    async fn get_profile(&self, owner_id: &str)
        -> Result<Option<BusinessProfile>, anyhow::Error>;
}

/// Read-only access to platform statistics.
#[async_trait]
pub trait PlatformStatsProvider: Send + Sync {
    /// Returns stats for the owner on one platform, or `None` if absent.
    async fn get_platform_stats(
        &self,
        owner_id: &str,
        platform: Platform,
    ) -> Result<Option<PlatformStats>, anyhow::Error>;
}

/// Read-only access to content templates.
#[async_trait]
pub trait TemplateProvider: Send + Sync {
    /// Returns active templates applicable to the task type, already ordered
    /// by priority descending then effectiveness descending.
    async fn get_templates(
        &self,
        owner_id: &str,
        task_type: TaskType,
    ) -> Result<Vec<Template>, anyhow::Error>;
}
