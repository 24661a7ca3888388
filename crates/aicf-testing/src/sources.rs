//! Synthesis of foreign stores for integration tests.
//!
//! These are the only writers of LevelDB/SQLite in the workspace; the
//! production readers open snapshot copies read-only.

use anyhow::{Context, Result, anyhow};
use rusty_leveldb::{DB, Options};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Build an Augment exchange value the way the kv-store carries them.
pub fn augment_exchange(conversation_id: &str, timestamp: &str, request: &str, response: &str) -> Value {
    json!({
        "conversationId": conversation_id,
        "timestamp": timestamp,
        "request_message": request,
        "response_text": response,
        "model_id": "model-test",
    })
}

/// Seed one VS Code workspace-storage entry with an Augment LevelDB store.
///
/// Returns the workspace-storage entry directory. `workspace_folder` is the
/// absolute project path recorded in `workspace.json`.
pub fn seed_augment_store(
    storage_root: &Path,
    entry_name: &str,
    workspace_folder: &Path,
    exchanges: &[Value],
) -> Result<PathBuf> {
    let entry_dir = storage_root.join(entry_name);
    std::fs::create_dir_all(&entry_dir)?;

    let meta = json!({ "folder": format!("file://{}", workspace_folder.display()) });
    std::fs::write(
        entry_dir.join("workspace.json"),
        serde_json::to_string_pretty(&meta)?,
    )?;

    let store_dir = entry_dir.join("Augment.vscode-augment/augment-kv-store");
    std::fs::create_dir_all(&store_dir)?;

    let mut options = Options::default();
    options.create_if_missing = true;
    let mut db = DB::open(&store_dir, options)
        .map_err(|e| anyhow!("leveldb open: {}", e))?;

    for exchange in exchanges {
        let id = exchange
            .get("conversationId")
            .and_then(|v| v.as_str())
            .context("exchange needs a conversationId")?;
        let key = format!("exchange:{}", id);
        db.put(key.as_bytes(), exchange.to_string().as_bytes())
            .map_err(|e| anyhow!("leveldb put: {}", e))?;
    }
    // Unrelated keys must be ignored by the reader.
    db.put(b"settings:theme", b"\"dark\"")
        .map_err(|e| anyhow!("leveldb put: {}", e))?;

    db.flush().map_err(|e| anyhow!("leveldb flush: {}", e))?;
    Ok(entry_dir)
}

/// Seed one Claude CLI session file under the encoded project directory.
pub fn seed_claude_session(
    projects_root: &Path,
    project_path: &Path,
    session_id: &str,
    events: &[Value],
) -> Result<PathBuf> {
    let encoded = format!(
        "-{}",
        project_path
            .to_string_lossy()
            .replace(['/', '.'], "-")
            .trim_start_matches('-')
    );
    let project_dir = projects_root.join(encoded);
    std::fs::create_dir_all(&project_dir)?;

    let path = project_dir.join(format!("{}.jsonl", session_id));
    let lines: Vec<String> = events.iter().map(|e| e.to_string()).collect();
    std::fs::write(&path, lines.join("\n"))?;
    Ok(path)
}

/// A pair of user/assistant events for a Claude CLI session.
pub fn claude_events(
    session_id: &str,
    cwd: &Path,
    timestamp: &str,
    user_text: &str,
    assistant_text: &str,
) -> Vec<Value> {
    vec![
        json!({
            "type": "user",
            "sessionId": session_id,
            "cwd": cwd.display().to_string(),
            "gitBranch": "main",
            "timestamp": timestamp,
            "message": {"role": "user", "content": user_text},
        }),
        json!({
            "type": "assistant",
            "sessionId": session_id,
            "timestamp": timestamp,
            "message": {
                "role": "assistant",
                "model": "model-test",
                "content": [{"type": "text", "text": assistant_text}],
                "usage": {"input_tokens": 12, "output_tokens": 34},
            },
        }),
    ]
}

/// Seed a Warp-style SQLite database with conversation payload rows.
pub fn seed_warp_db(db_path: &Path, rows: &[(String, Value)]) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = rusqlite::Connection::open(db_path)?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS agent_conversations (
            id TEXT PRIMARY KEY,
            conversation_data TEXT,
            last_modified_at TEXT,
            working_directory TEXT
        );
        "#,
    )?;

    for (working_directory, payload) in rows {
        let id = payload
            .get("id")
            .and_then(|v| v.as_str())
            .context("warp row needs an id")?;
        conn.execute(
            "INSERT OR REPLACE INTO agent_conversations VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                id,
                payload.to_string(),
                payload.get("timestamp").and_then(|v| v.as_str()),
                working_directory,
            ],
        )?;
    }

    Ok(())
}
