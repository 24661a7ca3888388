pub mod analysis;
pub mod error;
pub mod escape;
pub mod record;
pub mod source;
pub mod tier;
pub mod util;

pub use analysis::{
    AiAction, AnalysisResult, Confidence, Decision, Flow, Impact, Role, SessionStatus,
    TechnicalWork, UserIntent, WorkingState,
};
pub use error::{Error, Result};
pub use escape::{escape_field, escape_item};
pub use record::{CacheChunk, RawRecord};
pub use source::Source;
pub use tier::Tier;
pub use util::{canonical_json, content_hash, date_partition, truncate, truncate_chars};

/// Version string written to every per-conversation AICF file.
pub const AICF_VERSION: &str = "1.0";
