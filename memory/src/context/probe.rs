//! Task probe queries.
//!
//! Each task type maps to a fixed natural-language query describing the kind
//! of memory most useful for it. The probe is embedded and used for the
//! similarity search of the task tier.

use memory_core::{Platform, TaskType};

/// Builds the semantic search query for a task, optionally narrowed to a
/// platform.
pub(crate) fn task_probe(task_type: TaskType, platform: Option<Platform>) -> String {
    let base = match task_type {
        TaskType::PostGeneration => "writing style, voice and successful post patterns",
        TaskType::CaptionWriting => "caption style, tone and phrasing preferences",
        TaskType::HashtagSuggestion => "hashtag preferences and topics that perform well",
        TaskType::ContentIdeas => "content themes, audience interests and past ideas that worked",
        TaskType::CommentReply => "reply tone, customer interaction style and etiquette",
    };
    match platform {
        Some(p) => format!("{} on {}", base, p.display_name()),
        None => base.to_string(),
    }
}
