// Error types
pub mod error;

// Reader contract (public API)
pub mod traits;

// Snapshot-copy discipline
pub mod snapshot;

// Reader implementations
pub mod augment;
pub mod claude_cli;
pub mod claude_desktop;
pub mod warp;

// Shape-based SQLite probing shared by the unstable stores
pub(crate) mod sqlite_probe;

// Reader registry
pub mod registry;

pub use augment::AugmentReader;
pub use claude_cli::{ClaudeCliReader, sanitize_project_path};
pub use claude_desktop::ClaudeDesktopReader;
pub use warp::WarpReader;

pub use registry::{SourceRoots, all_readers, create_reader};
pub use snapshot::{OPEN_TIMEOUT, Snapshot, open_with_timeout};
pub use traits::{ProjectScope, ReadOutcome, SourceReader};

// Error types
pub use error::{Error, Result};
