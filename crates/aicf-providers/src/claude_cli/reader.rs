use crate::traits::{ProjectScope, ReadOutcome, SourceReader};
use crate::{Error, Result};
use aicf_types::{RawRecord, Source};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use super::schema::SessionEvent;

/// Reads Claude CLI session logs from `~/.claude/projects/`.
///
/// The CLI files sessions under one directory per project, named by the
/// sanitized project path, so workspace filtering is a directory pick rather
/// than a scan. Each session file becomes one record; its conversation ID is
/// the session ID.
pub struct ClaudeCliReader {
    projects_root: PathBuf,
}

impl ClaudeCliReader {
    pub fn new(projects_root: PathBuf) -> Self {
        Self { projects_root }
    }

    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".claude/projects")
    }

    fn session_files(&self, project_dir: &Path) -> Vec<PathBuf> {
        let Ok(dir) = std::fs::read_dir(project_dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = dir
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "jsonl"))
            .collect();
        files.sort();
        files
    }
}

impl SourceReader for ClaudeCliReader {
    fn source(&self) -> Source {
        Source::ClaudeCli
    }

    fn is_available(&self) -> bool {
        self.projects_root.is_dir()
    }

    fn read_all(&self, project: &ProjectScope) -> Result<ReadOutcome> {
        let mut outcome = ReadOutcome::default();

        let project_dir = self.projects_root.join(sanitize_project_path(&project.root));
        if !project_dir.is_dir() {
            return Ok(outcome);
        }

        let files = self.session_files(&project_dir);
        let total = files.len();
        let mut failed = 0usize;

        for path in files {
            match read_session_file(&path, project) {
                Ok(Some(record)) => outcome.records.push(record),
                Ok(None) => {}
                Err(_) => {
                    failed += 1;
                    outcome.skip(format!("claude-cli: unreadable session {}", path.display()));
                }
            }
        }

        if total > 0 && failed * 2 >= total {
            return Err(Error::Corrupt {
                source: Source::ClaudeCli.as_str().to_string(),
                failed,
                total,
            });
        }

        Ok(outcome)
    }
}

/// Encode a project root the way the CLI names its per-project directories:
/// `/home/user/alpha` becomes `-home-user-alpha`.
pub fn sanitize_project_path(root: &Path) -> String {
    let encoded = root
        .to_string_lossy()
        .replace(['/', '.'], "-")
        .trim_start_matches('-')
        .to_string();
    format!("-{}", encoded)
}

/// Parse one session file into a record, or `None` when the session holds no
/// messages for this project.
fn read_session_file(path: &Path, project: &ProjectScope) -> Result<Option<RawRecord>> {
    let text = std::fs::read_to_string(path)?;

    let mut session_id: Option<String> = None;
    let mut cwd: Option<String> = None;
    let mut git_branch: Option<String> = None;
    let mut messages: Vec<Value> = Vec::new();
    let mut first_ts: Option<String> = None;
    let mut last_ts: Option<String> = None;
    let mut bad_lines = 0usize;
    let mut total_lines = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total_lines += 1;

        let event: SessionEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(_) => {
                bad_lines += 1;
                continue;
            }
        };

        if session_id.is_none() {
            session_id = event.session_id.clone();
        }
        if cwd.is_none() {
            cwd = event.cwd.clone();
        }
        if git_branch.is_none() {
            git_branch = event.git_branch.clone();
        }

        if !event.is_message() {
            continue;
        }
        let Some(content) = event.content() else {
            continue;
        };
        let Some(role) = event.role() else {
            continue;
        };

        if let Some(ts) = &event.timestamp {
            if first_ts.is_none() {
                first_ts = Some(ts.clone());
            }
            last_ts = Some(ts.clone());
        }

        let mut message = json!({
            "role": role,
            "text": content.text(),
        });
        let obj = message.as_object_mut().expect("json! object");
        if let Some(ts) = &event.timestamp {
            obj.insert("timestamp".to_string(), json!(ts));
        }
        if let Some(thinking) = content.thinking() {
            obj.insert("thinking".to_string(), json!(thinking));
        }
        let tool_calls = content.tool_calls();
        if !tool_calls.is_empty() {
            obj.insert("toolCalls".to_string(), json!(tool_calls));
        }
        if let Some(msg) = &event.message {
            if let Some(model) = &msg.model {
                obj.insert("model".to_string(), json!(model));
            }
            if let Some(usage) = &msg.usage {
                obj.insert("usage".to_string(), usage.clone());
            }
        }
        messages.push(message);
    }

    // A file where every line failed to parse is a corrupt record.
    if total_lines > 0 && bad_lines == total_lines {
        return Err(Error::Corrupt {
            source: path.display().to_string(),
            failed: bad_lines,
            total: total_lines,
        });
    }

    if messages.is_empty() {
        return Ok(None);
    }

    // The per-directory pick already scopes to the project; a cwd that names
    // a different workspace means the session moved and must not leak in.
    if let Some(cwd_value) = &cwd {
        let basename = Path::new(cwd_value)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if !project.matches_workspace(&basename) {
            return Ok(None);
        }
    }

    let conversation_id = session_id.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    });

    let Some(timestamp) = first_ts else {
        return Ok(None);
    };
    let last_modified = last_ts.unwrap_or_else(|| timestamp.clone());

    let mut raw_data = json!({
        "sessionId": conversation_id,
        "messages": messages,
    });
    let obj = raw_data.as_object_mut().expect("json! object");
    if let Some(cwd_value) = &cwd {
        obj.insert("cwd".to_string(), json!(cwd_value));
    }
    if let Some(branch) = &git_branch {
        obj.insert("gitBranch".to_string(), json!(branch));
    }

    Ok(Some(RawRecord {
        source: Source::ClaudeCli,
        conversation_id,
        workspace_id: sanitize_project_path(&project.root),
        workspace_name: project.name.clone(),
        timestamp,
        last_modified,
        raw_data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_project_path() {
        assert_eq!(
            sanitize_project_path(Path::new("/home/user/alpha")),
            "-home-user-alpha"
        );
        assert_eq!(
            sanitize_project_path(Path::new("/srv/app.web")),
            "-srv-app-web"
        );
    }

    fn write_session(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn test_read_session_collects_messages() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_session(
            tmp.path(),
            "s1.jsonl",
            &[
                r#"{"type": "user", "sessionId": "s-1", "cwd": "/home/user/alpha", "gitBranch": "main", "timestamp": "2025-10-21T09:00:00Z", "message": {"role": "user", "content": "add a parser"}}"#,
                r#"{"type": "assistant", "timestamp": "2025-10-21T09:01:00Z", "message": {"role": "assistant", "model": "m-1", "content": [{"type": "text", "text": "Implemented the parser."}], "usage": {"input_tokens": 10, "output_tokens": 20}}}"#,
                r#"{"type": "summary", "summary": "ignored"}"#,
            ],
        );

        let scope = ProjectScope::new(Path::new("/home/user/alpha"));
        let record = read_session_file(&path, &scope).unwrap().unwrap();

        assert_eq!(record.conversation_id, "s-1");
        assert_eq!(record.timestamp, "2025-10-21T09:00:00Z");
        assert_eq!(record.last_modified, "2025-10-21T09:01:00Z");
        assert_eq!(record.workspace_name, "alpha");

        let messages = record.raw_data["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["model"], "m-1");
        assert_eq!(messages[1]["usage"]["output_tokens"], 20);
        assert_eq!(record.raw_data["gitBranch"], "main");
    }

    #[test]
    fn test_read_session_rejects_foreign_cwd() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_session(
            tmp.path(),
            "s2.jsonl",
            &[
                r#"{"type": "user", "sessionId": "s-2", "cwd": "/home/user/alpha-experiments", "timestamp": "2025-10-21T09:00:00Z", "message": {"role": "user", "content": "hello"}}"#,
            ],
        );

        let scope = ProjectScope::new(Path::new("/home/user/alpha"));
        assert!(read_session_file(&path, &scope).unwrap().is_none());
    }

    #[test]
    fn test_read_session_skips_bad_lines() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_session(
            tmp.path(),
            "s3.jsonl",
            &[
                "not json at all",
                r#"{"type": "user", "sessionId": "s-3", "timestamp": "2025-10-21T09:00:00Z", "message": {"role": "user", "content": "still readable"}}"#,
            ],
        );

        let scope = ProjectScope::new(Path::new("/home/user/alpha"));
        let record = read_session_file(&path, &scope).unwrap().unwrap();
        assert_eq!(record.conversation_id, "s-3");
    }

    #[test]
    fn test_fully_corrupt_session_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_session(tmp.path(), "s4.jsonl", &["garbage", "more garbage"]);

        let scope = ProjectScope::new(Path::new("/home/user/alpha"));
        assert!(read_session_file(&path, &scope).is_err());
    }
}
