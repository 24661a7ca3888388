use crate::{Error, Result};
use aicf_providers::ProjectScope;
use aicf_store::{CacheWriter, StageResult, StoreLayout};
use aicf_types::{RawRecord, Source};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub staged: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub diagnostics: Vec<String>,
}

/// Write a foreign export file into the cache for one source.
///
/// Import stages only; it never consolidates. Consolidation is always the
/// watcher's job, so an import is visible after the next cycle like any
/// other captured record.
pub fn import_export_file(
    project_root: &Path,
    source: Source,
    export_file: &Path,
) -> Result<ImportOutcome> {
    let layout = StoreLayout::new(project_root);
    if !layout.is_initialized() {
        return Err(Error::NotInitialized(format!(
            "run `aicf init` in {} first",
            project_root.display()
        )));
    }

    let scope = ProjectScope::new(project_root);
    let text = std::fs::read_to_string(export_file)?;
    let entries = parse_export(&text)
        .ok_or_else(|| Error::InvalidOperation(format!(
            "{} is neither a JSON array nor JSONL",
            export_file.display()
        )))?;

    let mut outcome = ImportOutcome::default();
    let mut writer = CacheWriter::open(&layout, source).map_err(Error::Store)?;

    for (index, value) in entries.into_iter().enumerate() {
        let Some(record) = record_from_export(value, source, &scope) else {
            outcome.skipped += 1;
            outcome
                .diagnostics
                .push(format!("entry {} lacks an id or timestamp", index));
            continue;
        };

        match writer.stage(record).map_err(Error::Store)? {
            StageResult::Written(_) => outcome.staged += 1,
            StageResult::Duplicate => outcome.duplicates += 1,
        }
    }

    Ok(outcome)
}

fn parse_export(text: &str) -> Option<Vec<Value>> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text.trim()) {
        return Some(items);
    }

    let mut items = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        items.push(serde_json::from_str(line).ok()?);
    }
    if items.is_empty() { None } else { Some(items) }
}

fn record_from_export(value: Value, source: Source, scope: &ProjectScope) -> Option<RawRecord> {
    let conversation_id = string_of(&value, &["conversationId", "conversation_id", "id", "uuid"])?;
    let timestamp = string_of(&value, &["timestamp", "createdAt", "created_at"])?;
    let last_modified = string_of(&value, &["lastModified", "last_modified", "updatedAt"])
        .unwrap_or_else(|| timestamp.clone());
    let workspace_name = string_of(&value, &["workspaceName", "workspace_name", "workspace"])
        .unwrap_or_else(|| scope.name.clone());

    Some(RawRecord {
        source,
        conversation_id,
        workspace_id: "import".to_string(),
        workspace_name,
        timestamp,
        last_modified,
        raw_data: value,
    })
}

fn string_of(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(k).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
