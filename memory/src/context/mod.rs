//! Context assembly: packs memories, profile data, platform statistics and
//! templates into a single token-bounded prompt fragment.

pub mod builder;
pub mod probe;
pub mod types;
pub mod utils;

pub use builder::ContextAssembler;
pub use types::{ContextMetadata, ContextRequest, ContextResult, DEFAULT_MAX_TOKENS};
pub use utils::estimate_tokens;
