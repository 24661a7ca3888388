//! One-shot operations behind the CLI verbs.

pub mod import;
pub mod init;
pub mod migrate;
pub mod status;

pub use import::{ImportOutcome, import_export_file};
pub use init::{InitMode, InitOutcome, init};
pub use migrate::{MigrateOutcome, migrate};
pub use status::{SourceStatus, StatusReport, status};
