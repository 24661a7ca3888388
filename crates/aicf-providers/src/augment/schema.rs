use serde::Deserialize;
use serde_json::Value;

/// `workspace.json` sitting next to each VS Code workspace-storage entry.
/// `folder` is a `file://` URI naming the workspace folder.
#[derive(Debug, Deserialize)]
pub(crate) struct WorkspaceJson {
    #[serde(default)]
    pub folder: Option<String>,
}

impl WorkspaceJson {
    /// Basename of the workspace folder, used for exact project matching.
    pub fn folder_basename(&self) -> Option<String> {
        let folder = self.folder.as_deref()?;
        let path = folder.strip_prefix("file://").unwrap_or(folder);
        let trimmed = path.trim_end_matches('/');
        trimmed.rsplit('/').next().map(|s| s.to_string())
    }
}

/// Value stored under an `exchange:`-prefixed key in the augment-kv-store.
///
/// Only the fields the pipeline consumes are typed; the full value is kept
/// verbatim as the record payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ExchangeValue {
    #[serde(default, rename = "conversationId")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub request_message: Option<String>,
    #[serde(default)]
    pub response_text: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub request_nodes: Option<Value>,
    #[serde(default)]
    pub response_nodes: Option<Value>,
}
