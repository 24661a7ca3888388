// Error types
pub mod error;

// On-disk layout
pub mod layout;

// Atomic file placement
pub mod fs;

// Cache chunk staging
pub mod cache;

// Per-conversation formats
pub mod aicf;
pub mod markdown;

// Session files and tier projection
pub mod session;

// Persisted state
pub mod config;
pub mod permissions;

pub use aicf::ConversationDoc;
pub use cache::{CacheWriter, StageResult, StagedChunk, StagedListing, list_staged};
pub use config::{DEFAULT_POLLING_INTERVAL_MS, WatcherConfig};
pub use fs::write_atomic;
pub use layout::StoreLayout;
pub use permissions::{PermissionAction, PermissionRecord, PermissionsLog};
pub use session::{SessionFile, SessionNotes, SessionRow};

// Error types
pub use error::{Error, Result};
