//! Shape-based probing for unstable SQLite stores.
//!
//! Claude Desktop and Warp do not publish their schemas and reshuffle them
//! between releases. Instead of pinning table names, the probe looks for any
//! table carrying a JSON payload column, attempts a JSON parse per row, and
//! extracts conversation fields from whichever keys are present. Absence of
//! matching tables degrades to an empty result with a diagnostic, never a
//! failure.

use crate::Result;
use chrono::DateTime;
use rusqlite::Connection;
use serde_json::Value;
use std::path::Path;

const DATA_COLUMNS: [&str; 7] = [
    "data",
    "value",
    "json",
    "conversation_data",
    "payload",
    "content",
    "body",
];

const ID_COLUMNS: [&str; 4] = ["id", "conversation_id", "uuid", "key"];

const TIMESTAMP_COLUMNS: [&str; 4] = ["timestamp", "created_at", "create_time", "started_at"];

const MODIFIED_COLUMNS: [&str; 4] = [
    "last_modified_at",
    "last_modified",
    "updated_at",
    "modified_at",
];

const WORKDIR_COLUMNS: [&str; 4] = ["working_directory", "cwd", "workspace", "project_path"];

/// One row that parsed as a conversation payload.
#[derive(Debug)]
pub(crate) struct ProbedRow {
    pub conversation_id: String,
    pub timestamp: String,
    pub last_modified: String,
    pub workspace_name: Option<String>,
    pub raw: Value,
}

#[derive(Debug, Default)]
pub(crate) struct ProbeOutcome {
    pub rows: Vec<ProbedRow>,
    pub failed: usize,
    pub attempted: usize,
    pub diagnostics: Vec<String>,
}

pub(crate) fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(tables)
}

pub(crate) fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Scan every table of an opened store for conversation-shaped rows.
pub(crate) fn probe_conversations(conn: &Connection, store_label: &str) -> Result<ProbeOutcome> {
    let mut outcome = ProbeOutcome::default();

    let tables = list_tables(conn)?;
    let mut matched_any = false;

    for table in &tables {
        let columns = table_columns(conn, table)?;
        let Some(data_col) = pick(&columns, &DATA_COLUMNS) else {
            continue;
        };
        matched_any = true;

        let id_col = pick(&columns, &ID_COLUMNS);
        let ts_col = pick(&columns, &TIMESTAMP_COLUMNS);
        let mod_col = pick(&columns, &MODIFIED_COLUMNS);
        let wd_col = pick(&columns, &WORKDIR_COLUMNS);

        probe_table(
            conn,
            table,
            &data_col,
            id_col.as_deref(),
            ts_col.as_deref(),
            mod_col.as_deref(),
            wd_col.as_deref(),
            &mut outcome,
        )?;
    }

    if !matched_any {
        outcome.diagnostics.push(format!(
            "{}: no conversation-shaped tables among [{}]",
            store_label,
            tables.join(", ")
        ));
    }

    Ok(outcome)
}

#[allow(clippy::too_many_arguments)]
fn probe_table(
    conn: &Connection,
    table: &str,
    data_col: &str,
    id_col: Option<&str>,
    ts_col: Option<&str>,
    mod_col: Option<&str>,
    wd_col: Option<&str>,
    outcome: &mut ProbeOutcome,
) -> Result<()> {
    let mut select = vec![quote_ident(data_col)];
    for col in [id_col, ts_col, mod_col, wd_col].into_iter().flatten() {
        select.push(quote_ident(col));
    }
    let sql = format!("SELECT {} FROM {}", select.join(", "), quote_ident(table));

    // Selected column positions after the data column, in declaration order.
    let mut extra = 1usize;
    let mut next_extra = |present: bool| -> Option<usize> {
        if present {
            let idx = extra;
            extra += 1;
            Some(idx)
        } else {
            None
        }
    };
    let id_idx = next_extra(id_col.is_some());
    let ts_idx = next_extra(ts_col.is_some());
    let mod_idx = next_extra(mod_col.is_some());
    let wd_idx = next_extra(wd_col.is_some());

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    while let Some(row) = rows.next()? {
        outcome.attempted += 1;

        let data: Option<String> = row.get::<_, Option<String>>(0).unwrap_or(None);
        let Some(data) = data else {
            outcome.failed += 1;
            continue;
        };

        let raw: Value = match serde_json::from_str(&data) {
            Ok(Value::Object(map)) => Value::Object(map),
            _ => {
                outcome.failed += 1;
                continue;
            }
        };

        let col_string = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| row.get::<_, Option<String>>(i).ok().flatten())
        };

        let conversation_id = json_string(&raw, &["conversationId", "conversation_id", "id", "uuid"])
            .or_else(|| col_string(id_idx));
        let Some(conversation_id) = conversation_id else {
            outcome.failed += 1;
            continue;
        };

        let timestamp = json_timestamp(&raw, &["timestamp", "createdAt", "created_at", "startedAt"])
            .or_else(|| col_string(ts_idx));
        let Some(timestamp) = timestamp else {
            outcome.failed += 1;
            continue;
        };

        let last_modified = json_timestamp(
            &raw,
            &["lastModified", "last_modified", "updatedAt", "updated_at"],
        )
        .or_else(|| col_string(mod_idx))
        .unwrap_or_else(|| timestamp.clone());

        let workspace_name =
            workspace_name_of(&raw).or_else(|| col_string(wd_idx).and_then(|wd| basename(&wd)));

        outcome.rows.push(ProbedRow {
            conversation_id,
            timestamp,
            last_modified,
            workspace_name,
            raw,
        });
    }

    Ok(())
}

fn pick(columns: &[String], wanted: &[&str]) -> Option<String> {
    for want in wanted {
        if let Some(col) = columns.iter().find(|c| c.eq_ignore_ascii_case(want)) {
            return Some(col.clone());
        }
    }
    None
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// First string value among the given keys.
pub(crate) fn json_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = value.get(key).and_then(|v| v.as_str()) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// First timestamp among the given keys; numeric epochs are normalized to
/// RFC 3339.
pub(crate) fn json_timestamp(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match value.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => {
                if let Some(ts) = epoch_to_rfc3339(n.as_i64()?) {
                    return Some(ts);
                }
            }
            _ => {}
        }
    }
    None
}

fn epoch_to_rfc3339(epoch: i64) -> Option<String> {
    // Millisecond epochs are 13 digits in the current era, seconds 10.
    let secs = if epoch > 100_000_000_000 {
        epoch / 1000
    } else {
        epoch
    };
    DateTime::from_timestamp(secs, 0).map(|dt| dt.to_rfc3339())
}

/// Workspace attribution from a payload: either an explicit name, or the
/// basename of a working-directory path.
pub(crate) fn workspace_name_of(value: &Value) -> Option<String> {
    if let Some(name) = json_string(
        value,
        &[
            "workspaceName",
            "workspace_name",
            "workspace",
            "projectName",
            "project_name",
            "project",
        ],
    ) {
        return Some(name);
    }

    json_string(
        value,
        &[
            "workingDirectory",
            "working_directory",
            "cwd",
            "workspaceFolder",
            "projectPath",
            "project_path",
        ],
    )
    .and_then(|path| basename(&path))
}

fn basename(path: &str) -> Option<String> {
    Path::new(path.trim_end_matches('/'))
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
}
