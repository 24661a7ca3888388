use crate::snapshot::{Snapshot, open_with_timeout};
use crate::sqlite_probe;
use crate::traits::{ProjectScope, ReadOutcome, SourceReader};
use crate::{Error, Result};
use aicf_types::{RawRecord, Source};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;

/// Reads Warp's AI conversation store.
///
/// Warp keeps a single SQLite database; its agent tables move between
/// releases, so the same shape-based probe as Claude Desktop applies.
/// Workspace attribution comes from the payload or a working-directory
/// column, matched exactly against the project basename.
pub struct WarpReader {
    db_paths: Vec<PathBuf>,
}

impl WarpReader {
    pub fn new(db_paths: Vec<PathBuf>) -> Self {
        Self { db_paths }
    }

    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".local/state/warp-terminal/warp.sqlite"));
            paths.push(home.join("Library/Application Support/dev.warp.Warp-Stable/warp.sqlite"));
        }
        paths
    }
}

impl SourceReader for WarpReader {
    fn source(&self) -> Source {
        Source::Warp
    }

    fn is_available(&self) -> bool {
        self.db_paths.iter().any(|path| path.is_file())
    }

    fn read_all(&self, project: &ProjectScope) -> Result<ReadOutcome> {
        let mut outcome = ReadOutcome::default();
        let mut failed = 0usize;
        let mut attempted = 0usize;

        for db_path in &self.db_paths {
            if !db_path.is_file() {
                continue;
            }

            let snapshot = Snapshot::of_file(db_path)?;
            let label = format!("warp {}", db_path.display());
            let snapshot_path = snapshot.path().to_path_buf();

            let probe = open_with_timeout("warp-sqlite", move || {
                let conn = Connection::open_with_flags(
                    &snapshot_path,
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )?;
                sqlite_probe::probe_conversations(&conn, &label)
            })?;

            failed += probe.failed;
            attempted += probe.attempted;
            outcome.corrupt_skipped += probe.failed;
            outcome.diagnostics.extend(probe.diagnostics);

            let workspace_id = db_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            for row in probe.rows {
                let Some(workspace_name) = row.workspace_name else {
                    continue;
                };
                if !project.matches_workspace(&workspace_name) {
                    continue;
                }

                outcome.records.push(RawRecord {
                    source: Source::Warp,
                    conversation_id: row.conversation_id,
                    workspace_id: workspace_id.clone(),
                    workspace_name,
                    timestamp: row.timestamp,
                    last_modified: row.last_modified,
                    raw_data: row.raw,
                });
            }
        }

        if attempted > 0 && failed * 2 >= attempted {
            return Err(Error::Corrupt {
                source: Source::Warp.as_str().to_string(),
                failed,
                total: attempted,
            });
        }

        Ok(outcome)
    }
}
