//! Greedy three-tier context packing.
//!
//! Tier order is fixed: core identity first (never budget-gated), then
//! task-relevant knowledge, then extended brand detail. A tier only opens
//! when its full budget still fits under the request's `max_tokens`; inside
//! an open tier every piece is fit-tested individually, so a long piece is
//! skipped rather than truncated.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use memory_core::{
    BusinessProfile, MemoryError, MemorySearch, PlatformStatsProvider, ProfileProvider,
    TemplateProvider,
};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::context::probe::task_probe;
use crate::context::types::{ContextMetadata, ContextRequest, ContextResult};
use crate::context::utils::estimate_tokens;
use crate::service::MemoryService;

/// Token budget reserved for the task tier when it opens.
const TASK_TIER_BUDGET: usize = 400;
/// Token budget reserved for the extended tier when it opens.
const EXTENDED_TIER_BUDGET: usize = 200;
/// At most this many templates make it into the task tier.
const MAX_TEMPLATES: usize = 2;
/// Top selling points carried into the core tier.
const MAX_SELLING_POINTS: usize = 3;

/// Assembles token-bounded context from memories and snapshot providers.
pub struct ContextAssembler {
    memories: Arc<MemoryService>,
    profiles: Arc<dyn ProfileProvider>,
    platform_stats: Arc<dyn PlatformStatsProvider>,
    templates: Arc<dyn TemplateProvider>,
}

impl ContextAssembler {
    pub fn new(
        memories: Arc<MemoryService>,
        profiles: Arc<dyn ProfileProvider>,
        platform_stats: Arc<dyn PlatformStatsProvider>,
        templates: Arc<dyn TemplateProvider>,
    ) -> Self {
        Self {
            memories,
            profiles,
            platform_stats,
            templates,
        }
    }

    /// Builds the context string for one request.
    ///
    /// Usage counters for the included memories are recorded fire-and-forget;
    /// a failed counter update is logged and never delays the response.
    #[instrument(skip(self, request), fields(owner_id = %request.owner_id, task_type = %request.task_type))]
    pub async fn build(&self, request: ContextRequest) -> Result<ContextResult, MemoryError> {
        let mut blocks: Vec<String> = Vec::new();
        let mut tokens_used = 0usize;
        let mut memory_ids: Vec<Uuid> = Vec::new();
        let mut template_ids: Vec<Uuid> = Vec::new();
        let mut included: HashSet<Uuid> = HashSet::new();

        let mut metadata = ContextMetadata {
            core_tier: false,
            task_tier: false,
            extended_tier: false,
            profile_included: false,
            platform_included: false,
            pinned_count: 0,
            relevant_count: 0,
            built_at: Utc::now(),
        };

        let profile = self.profiles.get_profile(&request.owner_id).await?;

        // Core tier: who the business is. Never gated; without it the model
        // has nothing to anchor on.
        if let Some(profile) = &profile {
            if let Some(core) = render_core(profile) {
                tokens_used += estimate_tokens(&core);
                blocks.push(core);
                metadata.core_tier = true;
                metadata.profile_included = true;
            }
        }

        // Task tier: pinned memories, semantically relevant memories,
        // platform stats, templates. Opens only when its full budget fits.
        if tokens_used + TASK_TIER_BUDGET <= request.max_tokens {
            let mut tier_remaining = TASK_TIER_BUDGET;
            let mut lines: Vec<String> = Vec::new();

            for memory in self.memories.get_pinned(&request.owner_id).await? {
                let line = format!("- {}", memory.content);
                let cost = estimate_tokens(&line);
                if cost > tier_remaining {
                    continue;
                }
                tier_remaining -= cost;
                included.insert(memory.id);
                memory_ids.push(memory.id);
                metadata.pinned_count += 1;
                lines.push(line);
            }

            let search = MemorySearch::new(&request.owner_id)
                .with_query(task_probe(request.task_type, request.platform));
            for hit in self.memories.search(search).await? {
                if included.contains(&hit.memory.id) {
                    continue;
                }
                let line = format!("- {}", hit.memory.content);
                let cost = estimate_tokens(&line);
                if cost > tier_remaining {
                    continue;
                }
                tier_remaining -= cost;
                included.insert(hit.memory.id);
                memory_ids.push(hit.memory.id);
                metadata.relevant_count += 1;
                lines.push(line);
            }

            if let Some(platform) = request.platform {
                match self
                    .platform_stats
                    .get_platform_stats(&request.owner_id, platform)
                    .await
                {
                    Ok(Some(stats)) => {
                        let mut line = format!(
                            "{} stats: {} followers, {:.1}% engagement",
                            platform.display_name(),
                            stats.followers,
                            stats.engagement_rate
                        );
                        if !stats.best_posting_times.is_empty() {
                            line.push_str(&format!(
                                "; best posting times: {}",
                                stats.best_posting_times.join(", ")
                            ));
                        }
                        if !stats.top_topics.is_empty() {
                            line.push_str(&format!(
                                "; top topics: {}",
                                stats.top_topics.join(", ")
                            ));
                        }
                        let cost = estimate_tokens(&line);
                        if cost <= tier_remaining {
                            tier_remaining -= cost;
                            metadata.platform_included = true;
                            lines.push(line);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        // Stats are decorative; the context stands without them.
                        warn!(error = %e, "platform stats unavailable, continuing without");
                    }
                }
            }

            let templates = self
                .templates
                .get_templates(&request.owner_id, request.task_type)
                .await?;
            for template in templates.into_iter().take(MAX_TEMPLATES) {
                let line = format!("Template \"{}\": {}", template.name, template.body);
                let cost = estimate_tokens(&line);
                if cost > tier_remaining {
                    continue;
                }
                tier_remaining -= cost;
                template_ids.push(template.id);
                lines.push(line);
            }

            if !lines.is_empty() {
                // Charge the per-piece costs reserved during fit-testing;
                // the joining newlines are free.
                tokens_used += TASK_TIER_BUDGET - tier_remaining;
                blocks.push(lines.join("\n"));
                metadata.task_tier = true;
            }
        }

        // Extended tier: secondary brand detail, each field fit-tested on
        // its own.
        if tokens_used + EXTENDED_TIER_BUDGET <= request.max_tokens {
            if let Some(profile) = &profile {
                let mut tier_remaining = EXTENDED_TIER_BUDGET;
                let mut lines: Vec<String> = Vec::new();

                let mut push_if_fits = |line: String, remaining: &mut usize| {
                    let cost = estimate_tokens(&line);
                    if cost <= *remaining {
                        *remaining -= cost;
                        lines.push(line);
                    }
                };

                if !profile.brand_values.is_empty() {
                    push_if_fits(
                        format!("Brand values: {}", profile.brand_values.join(", ")),
                        &mut tier_remaining,
                    );
                }
                if !profile.highlighted_products.is_empty() {
                    let rendered: Vec<String> = profile
                        .highlighted_products
                        .iter()
                        .map(|p| match &p.price {
                            Some(price) => format!("{} ({})", p.name, price),
                            None => p.name.clone(),
                        })
                        .collect();
                    push_if_fits(
                        format!("Products: {}", rendered.join(", ")),
                        &mut tier_remaining,
                    );
                }
                if !profile.words_to_avoid.is_empty() {
                    push_if_fits(
                        format!("Avoid: {}", profile.words_to_avoid.join(", ")),
                        &mut tier_remaining,
                    );
                }
                if !profile.words_to_emphasize.is_empty() {
                    push_if_fits(
                        format!("Emphasize: {}", profile.words_to_emphasize.join(", ")),
                        &mut tier_remaining,
                    );
                }
                if !profile.brand_colors.is_empty() {
                    push_if_fits(
                        format!("Brand colors: {}", profile.brand_colors.join(", ")),
                        &mut tier_remaining,
                    );
                }

                if !lines.is_empty() {
                    tokens_used += EXTENDED_TIER_BUDGET - tier_remaining;
                    blocks.push(lines.join("\n"));
                    metadata.extended_tier = true;
                }
            }
        }

        // Freeform extra goes last and is dropped silently when over budget.
        if let Some(extra) = request.extra.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let cost = estimate_tokens(extra);
            if tokens_used + cost <= request.max_tokens {
                tokens_used += cost;
                blocks.push(extra.to_string());
            } else {
                debug!(cost, tokens_used, "freeform extra dropped, over budget");
            }
        }

        self.spawn_usage_recording(&memory_ids);

        debug!(
            tokens_used,
            memories = memory_ids.len(),
            templates = template_ids.len(),
            "context assembled"
        );
        Ok(ContextResult {
            context: blocks.join("\n\n"),
            tokens_used,
            memory_ids,
            template_ids,
            metadata,
        })
    }

    fn spawn_usage_recording(&self, memory_ids: &[Uuid]) {
        if memory_ids.is_empty() {
            return;
        }
        let memories = self.memories.clone();
        let ids = memory_ids.to_vec();
        tokio::spawn(async move {
            for id in ids {
                if let Err(e) = memories.record_usage(id).await {
                    warn!(memory_id = %id, error = %e, "usage recording failed");
                }
            }
        });
    }
}

/// Renders the core identity block, or `None` when the profile carries no
/// usable field.
fn render_core(profile: &BusinessProfile) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();

    if let Some(name) = non_empty(&profile.name) {
        match non_empty(&profile.business_type) {
            Some(business_type) => lines.push(format!("Business: {name} ({business_type})")),
            None => lines.push(format!("Business: {name}")),
        }
    }
    if let Some(tagline) = profile.tagline.as_deref().and_then(non_empty) {
        lines.push(format!("Tagline: {tagline}"));
    }
    if let Some(description) = profile.description.as_deref().and_then(non_empty) {
        lines.push(format!("About: {description}"));
    }
    if let Some(tone) = profile.brand_voice_tone.as_deref().and_then(non_empty) {
        lines.push(format!("Brand voice: {tone}"));
    }
    if let Some(audience) = profile.target_audience.as_deref().and_then(non_empty) {
        lines.push(format!("Target audience: {audience}"));
    }
    if !profile.unique_selling_points.is_empty() {
        let points: Vec<&str> = profile
            .unique_selling_points
            .iter()
            .take(MAX_SELLING_POINTS)
            .map(String::as_str)
            .collect();
        lines.push(format!("Key selling points: {}", points.join("; ")));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
