use crate::snapshot::{Snapshot, open_with_timeout};
use crate::traits::{ProjectScope, ReadOutcome, SourceReader};
use crate::{Error, Result};
use aicf_types::{RawRecord, Source};
use rusty_leveldb::{DB, LdbIterator, Options};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::schema::{ExchangeValue, WorkspaceJson};

const KV_STORE_SUBDIR: &str = "Augment.vscode-augment/augment-kv-store";
const EXCHANGE_PREFIX: &[u8] = b"exchange:";

/// Reads Augment conversations out of VS Code workspace storage.
///
/// Each `workspaceStorage/<id>/` entry carries a `workspace.json` naming the
/// owning folder; only entries whose folder basename equals the project name
/// are opened. The LevelDB store itself is opened from a snapshot copy, never
/// from the live path.
pub struct AugmentReader {
    storage_roots: Vec<PathBuf>,
}

impl AugmentReader {
    pub fn new(storage_roots: Vec<PathBuf>) -> Self {
        Self { storage_roots }
    }

    /// Default VS Code-style workspace storage locations.
    pub fn default_roots() -> Vec<PathBuf> {
        let mut roots = Vec::new();
        if let Some(config) = dirs::config_dir() {
            for product in ["Code", "Code - Insiders", "VSCodium"] {
                roots.push(config.join(product).join("User/workspaceStorage"));
            }
        }
        roots
    }

    fn workspace_entries(&self) -> Vec<PathBuf> {
        let mut entries = Vec::new();
        for root in &self.storage_roots {
            let Ok(dir) = std::fs::read_dir(root) else {
                continue;
            };
            for entry in dir.flatten() {
                if entry.path().is_dir() {
                    entries.push(entry.path());
                }
            }
        }
        entries.sort();
        entries
    }

    fn read_store(
        &self,
        workspace_dir: &Path,
        scope: &ProjectScope,
        outcome: &mut ReadOutcome,
    ) -> Result<()> {
        let store_dir = workspace_dir.join(KV_STORE_SUBDIR);
        if !store_dir.is_dir() {
            return Ok(());
        }

        let workspace_id = workspace_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let snapshot = Snapshot::of_dir(&store_dir)?;
        let entries = read_exchange_entries(&snapshot)?;

        let mut failed = 0usize;
        let total = entries.len();

        for (key, value_bytes) in entries {
            match parse_exchange(&key, &value_bytes) {
                ParsedExchange::Record {
                    conversation_id,
                    timestamp,
                    last_modified,
                    raw_data,
                } => {
                    outcome.records.push(RawRecord {
                        source: Source::Augment,
                        conversation_id,
                        workspace_id: workspace_id.clone(),
                        workspace_name: scope.name.clone(),
                        timestamp,
                        last_modified,
                        raw_data,
                    });
                }
                // Bookkeeping entries with no conversational content are
                // normal; only unreadable values count toward corruption.
                ParsedExchange::NotConversation => {}
                ParsedExchange::Unreadable => {
                    failed += 1;
                    outcome.skip(format!("augment: unreadable exchange value at key {}", key));
                }
            }
        }

        if total > 0 && failed * 2 >= total {
            return Err(Error::Corrupt {
                source: Source::Augment.as_str().to_string(),
                failed,
                total,
            });
        }

        Ok(())
    }
}

impl SourceReader for AugmentReader {
    fn source(&self) -> Source {
        Source::Augment
    }

    fn is_available(&self) -> bool {
        self.workspace_entries()
            .iter()
            .any(|dir| dir.join(KV_STORE_SUBDIR).is_dir())
    }

    fn read_all(&self, project: &ProjectScope) -> Result<ReadOutcome> {
        let mut outcome = ReadOutcome::default();

        for workspace_dir in self.workspace_entries() {
            let meta_path = workspace_dir.join("workspace.json");
            let Ok(meta_text) = std::fs::read_to_string(&meta_path) else {
                continue;
            };
            let Ok(meta) = serde_json::from_str::<WorkspaceJson>(&meta_text) else {
                outcome.diagnostics.push(format!(
                    "augment: unreadable workspace.json in {}",
                    workspace_dir.display()
                ));
                continue;
            };

            let Some(folder_name) = meta.folder_basename() else {
                continue;
            };
            if !project.matches_workspace(&folder_name) {
                continue;
            }

            self.read_store(&workspace_dir, project, &mut outcome)?;
        }

        Ok(outcome)
    }
}

/// Pull every `exchange:`-prefixed entry out of a snapshotted store.
///
/// The open runs on a worker thread under the 5s cap; LevelDB takes its own
/// file lock even on the copy, and a wedged manifest must not hang the cycle.
fn read_exchange_entries(snapshot: &Snapshot) -> Result<Vec<(String, Vec<u8>)>> {
    let store_path = snapshot.path().to_path_buf();

    open_with_timeout("augment-kv-store", move || {
        let mut options = Options::default();
        options.create_if_missing = false;

        let mut db =
            DB::open(&store_path, options).map_err(|e| Error::LevelDb(e.to_string()))?;
        let mut iter = db.new_iter().map_err(|e| Error::LevelDb(e.to_string()))?;

        let mut entries = Vec::new();
        let mut key = Vec::new();
        let mut value = Vec::new();
        while iter.advance() {
            if !iter.current(&mut key, &mut value) {
                break;
            }
            if key.starts_with(EXCHANGE_PREFIX) {
                entries.push((String::from_utf8_lossy(&key).to_string(), value.clone()));
            }
        }

        Ok(entries)
    })
}

enum ParsedExchange {
    Record {
        conversation_id: String,
        timestamp: String,
        last_modified: String,
        raw_data: Value,
    },
    NotConversation,
    Unreadable,
}

fn parse_exchange(key: &str, value_bytes: &[u8]) -> ParsedExchange {
    let Ok(raw_data) = serde_json::from_slice::<Value>(value_bytes) else {
        return ParsedExchange::Unreadable;
    };
    let Ok(exchange) = serde_json::from_value::<ExchangeValue>(raw_data.clone()) else {
        return ParsedExchange::Unreadable;
    };

    if exchange.request_message.is_none() && exchange.response_text.is_none() {
        return ParsedExchange::NotConversation;
    }

    let conversation_id = match exchange
        .conversation_id
        .clone()
        .or_else(|| key.strip_prefix("exchange:").map(|s| s.to_string()))
    {
        Some(id) => id,
        None => return ParsedExchange::Unreadable,
    };

    let Some(timestamp) = exchange.timestamp.clone() else {
        return ParsedExchange::Unreadable;
    };
    let last_modified = exchange.last_updated.clone().unwrap_or_else(|| timestamp.clone());

    ParsedExchange::Record {
        conversation_id,
        timestamp,
        last_modified,
        raw_data,
    }
}
