use crate::snapshot::{Snapshot, open_with_timeout};
use crate::sqlite_probe::{self, ProbedRow};
use crate::traits::{ProjectScope, ReadOutcome, SourceReader};
use crate::{Error, Result};
use aicf_types::{RawRecord, Source};
use rusqlite::{Connection, OpenFlags};
use rusty_leveldb::{DB, LdbIterator, Options};
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Reads Claude Desktop's local stores.
///
/// The desktop app does not keep a stable schema; this reader probes SQLite
/// files by shape and LevelDB values by JSON parse, and degrades to an empty
/// read with a diagnostic when nothing matches. Records that carry no
/// workspace attribution are skipped: exact workspace matching is the
/// isolation invariant and an unattributed record cannot satisfy it.
pub struct ClaudeDesktopReader {
    store_roots: Vec<PathBuf>,
}

impl ClaudeDesktopReader {
    pub fn new(store_roots: Vec<PathBuf>) -> Self {
        Self { store_roots }
    }

    pub fn default_roots() -> Vec<PathBuf> {
        let mut roots = Vec::new();
        if let Some(config) = dirs::config_dir() {
            roots.push(config.join("Claude"));
        }
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join(".config/Claude"));
        }
        roots.dedup();
        roots
    }

    fn sqlite_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for root in &self.store_roots {
            for entry in WalkDir::new(root)
                .max_depth(3)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file()
                    && path
                        .extension()
                        .is_some_and(|e| e == "db" || e == "sqlite" || e == "sqlite3")
                {
                    files.push(path.to_path_buf());
                }
            }
        }
        files.sort();
        files
    }

    fn leveldb_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for root in &self.store_roots {
            for entry in WalkDir::new(root)
                .max_depth(3)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_dir() && path.file_name().is_some_and(|n| n == "leveldb") {
                    dirs.push(path.to_path_buf());
                }
            }
        }
        dirs.sort();
        dirs
    }
}

impl SourceReader for ClaudeDesktopReader {
    fn source(&self) -> Source {
        Source::ClaudeDesktop
    }

    fn is_available(&self) -> bool {
        self.store_roots.iter().any(|root| root.is_dir())
    }

    fn read_all(&self, project: &ProjectScope) -> Result<ReadOutcome> {
        let mut outcome = ReadOutcome::default();
        let mut failed = 0usize;
        let mut attempted = 0usize;

        for db_path in self.sqlite_files() {
            let snapshot = Snapshot::of_file(&db_path)?;
            let probe = read_sqlite_store(&snapshot, &db_path)?;

            failed += probe.failed;
            attempted += probe.attempted;
            outcome.corrupt_skipped += probe.failed;
            outcome.diagnostics.extend(probe.diagnostics);

            collect_rows(probe.rows, project, &db_path, &mut outcome);
        }

        for ldb_dir in self.leveldb_dirs() {
            let snapshot = Snapshot::of_dir(&ldb_dir)?;
            match read_leveldb_store(&snapshot) {
                Ok(rows) => collect_rows(rows, project, &ldb_dir, &mut outcome),
                Err(Error::Locked(msg)) => {
                    // A wedged LevelDB must not take the SQLite results with it.
                    outcome
                        .diagnostics
                        .push(format!("claude-desktop: {}", msg));
                }
                Err(other) => return Err(other),
            }
        }

        if attempted > 0 && failed * 2 >= attempted {
            return Err(Error::Corrupt {
                source: Source::ClaudeDesktop.as_str().to_string(),
                failed,
                total: attempted,
            });
        }

        Ok(outcome)
    }
}

fn collect_rows(
    rows: Vec<ProbedRow>,
    project: &ProjectScope,
    store_path: &Path,
    outcome: &mut ReadOutcome,
) {
    let workspace_id = store_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    for row in rows {
        let Some(workspace_name) = row.workspace_name else {
            continue;
        };
        if !project.matches_workspace(&workspace_name) {
            continue;
        }

        outcome.records.push(RawRecord {
            source: Source::ClaudeDesktop,
            conversation_id: row.conversation_id,
            workspace_id: workspace_id.clone(),
            workspace_name,
            timestamp: row.timestamp,
            last_modified: row.last_modified,
            raw_data: row.raw,
        });
    }
}

fn read_sqlite_store(snapshot: &Snapshot, original: &Path) -> Result<sqlite_probe::ProbeOutcome> {
    let path = snapshot.path().to_path_buf();
    let label = format!("claude-desktop {}", original.display());

    open_with_timeout("claude-desktop-sqlite", move || {
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        sqlite_probe::probe_conversations(&conn, &label)
    })
}

/// Walk every LevelDB entry, keep the values that parse as conversation
/// objects. Most keys in the desktop store are unrelated; unparseable values
/// are skipped without ceremony.
fn read_leveldb_store(snapshot: &Snapshot) -> Result<Vec<ProbedRow>> {
    let path = snapshot.path().to_path_buf();

    open_with_timeout("claude-desktop-leveldb", move || {
        let mut options = Options::default();
        options.create_if_missing = false;

        let mut db = DB::open(&path, options).map_err(|e| Error::LevelDb(e.to_string()))?;
        let mut iter = db.new_iter().map_err(|e| Error::LevelDb(e.to_string()))?;

        let mut rows = Vec::new();
        let mut key = Vec::new();
        let mut value = Vec::new();
        while iter.advance() {
            if !iter.current(&mut key, &mut value) {
                break;
            }
            if let Some(row) = probe_leveldb_value(&value) {
                rows.push(row);
            }
        }

        Ok(rows)
    })
}

fn probe_leveldb_value(value_bytes: &[u8]) -> Option<ProbedRow> {
    let raw: Value = serde_json::from_slice(value_bytes).ok()?;
    if !raw.is_object() {
        return None;
    }

    let conversation_id =
        sqlite_probe::json_string(&raw, &["conversationId", "conversation_id", "id", "uuid"])?;
    let timestamp = sqlite_probe::json_timestamp(
        &raw,
        &["timestamp", "createdAt", "created_at", "startedAt"],
    )?;
    let last_modified = sqlite_probe::json_timestamp(
        &raw,
        &["lastModified", "last_modified", "updatedAt", "updated_at"],
    )
    .unwrap_or_else(|| timestamp.clone());

    Some(ProbedRow {
        conversation_id,
        timestamp,
        last_modified,
        workspace_name: sqlite_probe::workspace_name_of(&raw),
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_probe_leveldb_value_requires_conversation_shape() {
        assert!(probe_leveldb_value(b"plain text").is_none());
        assert!(probe_leveldb_value(br#"{"settings": true}"#).is_none());

        let value = json!({
            "conversationId": "c-9",
            "timestamp": "2025-10-21T09:00:00Z",
            "workspace": "alpha",
        });
        let row = probe_leveldb_value(value.to_string().as_bytes()).unwrap();
        assert_eq!(row.conversation_id, "c-9");
        assert_eq!(row.workspace_name.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_unattributed_rows_are_dropped() {
        let mut outcome = ReadOutcome::default();
        let project = ProjectScope::new(Path::new("/home/user/alpha"));
        let rows = vec![ProbedRow {
            conversation_id: "c-1".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:00:00Z".to_string(),
            workspace_name: None,
            raw: json!({}),
        }];

        collect_rows(rows, &project, Path::new("/tmp/state.db"), &mut outcome);
        assert!(outcome.records.is_empty());
    }
}
