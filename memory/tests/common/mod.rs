//! Shared fixtures for integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use embedding::EmbeddingService;
use memory::{
    BusinessProfile, ContextAssembler, InMemoryRepository, MemoryService, Platform,
    PlatformStats, PlatformStatsProvider, Product, ProfileProvider, TaskType, Template,
    TemplateProvider,
};
use uuid::Uuid;

/// Embedding stub returning one fixed vector for every text, so every memory
/// has similarity 1.0 to every query.
pub struct FixedEmbedding;

#[async_trait]
impl EmbeddingService for FixedEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
        Ok(vec![1.0, 0.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
    }
}

pub struct StaticProfiles {
    pub profile: Option<BusinessProfile>,
}

#[async_trait]
impl ProfileProvider for StaticProfiles {
    async fn get_profile(
        &self,
        _owner_id: &str,
    ) -> Result<Option<BusinessProfile>, anyhow::Error> {
        Ok(self.profile.clone())
    }
}

pub struct StaticStats {
    pub stats: Option<PlatformStats>,
}

#[async_trait]
impl PlatformStatsProvider for StaticStats {
    async fn get_platform_stats(
        &self,
        _owner_id: &str,
        _platform: Platform,
    ) -> Result<Option<PlatformStats>, anyhow::Error> {
        Ok(self.stats.clone())
    }
}

pub struct StaticTemplates {
    pub templates: Vec<Template>,
}

#[async_trait]
impl TemplateProvider for StaticTemplates {
    async fn get_templates(
        &self,
        _owner_id: &str,
        _task_type: TaskType,
    ) -> Result<Vec<Template>, anyhow::Error> {
        Ok(self.templates.clone())
    }
}

pub fn sample_profile() -> BusinessProfile {
    BusinessProfile {
        name: "Mori Coffee".to_string(),
        business_type: "cafe".to_string(),
        tagline: Some("Slow mornings, good beans".to_string()),
        description: Some("Neighbourhood cafe roasting single-origin beans on site".to_string()),
        brand_voice_tone: Some("warm, unhurried".to_string()),
        target_audience: Some("local remote workers".to_string()),
        unique_selling_points: vec![
            "single origin".to_string(),
            "roasted on site".to_string(),
        ],
        brand_values: vec!["sustainability".to_string(), "community".to_string()],
        highlighted_products: vec![Product {
            name: "Oat latte".to_string(),
            price: Some("$5".to_string()),
        }],
        words_to_avoid: vec!["cheap".to_string()],
        words_to_emphasize: vec!["handcrafted".to_string()],
        brand_colors: vec!["forest green".to_string()],
    }
}

pub fn sample_template(name: &str) -> Template {
    Template {
        id: Uuid::new_v4(),
        name: name.to_string(),
        body: "Hook, story, call to action".to_string(),
        task_type: TaskType::PostGeneration,
        priority: 10,
        effectiveness: Some(0.8),
    }
}

/// Builds a full assembler stack around an in-memory repository.
pub fn assembler(
    profile: Option<BusinessProfile>,
    stats: Option<PlatformStats>,
    templates: Vec<Template>,
) -> (ContextAssembler, Arc<MemoryService>, Arc<InMemoryRepository>) {
    let repository = Arc::new(InMemoryRepository::new());
    let service = Arc::new(MemoryService::new(repository.clone(), Arc::new(FixedEmbedding)));
    let assembler = ContextAssembler::new(
        service.clone(),
        Arc::new(StaticProfiles { profile }),
        Arc::new(StaticStats { stats }),
        Arc::new(StaticTemplates { templates }),
    );
    (assembler, service, repository)
}
