// Error types
pub mod error;

// Cycle diagnostics
pub mod report;

// Exclusive cycle lock
pub mod lock;

// Pipeline stages
pub mod consolidate;
pub mod dropoff;
pub mod ingest;
pub mod sessions;

// Cycle runner and watcher loop
pub mod cycle;
pub mod watch;

// One-shot operations
pub mod ops;

pub use cycle::{CycleOptions, run_cycle};
pub use lock::CycleLock;
pub use report::{
    ConsolidationReport, CycleReport, DropoffMove, DropoffReport, SessionReport, SourceOutcome,
    SourceReport,
};
pub use watch::{WatchOptions, watch};

// Error types
pub use error::{Error, Result};
