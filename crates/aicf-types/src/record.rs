use crate::source::Source;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One conversation record as extracted from a foreign store.
///
/// `(source, conversation_id)` is unique within a run; `content_hash` is the
/// deduplication key across the whole system. Timestamps are carried verbatim
/// as RFC 3339 strings for historical accuracy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub source: Source,
    pub conversation_id: String,
    pub workspace_id: String,
    pub workspace_name: String,
    pub timestamp: String,
    pub last_modified: String,
    pub raw_data: Value,
}

/// Persistent representation of one raw record, staged under
/// `.cache/llm/<source>/chunk-<N>.json`.
///
/// Chunks are immutable after creation. `workspace_name` is embedded so
/// downstream stages can re-filter without re-reading the foreign store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheChunk {
    pub chunk_id: u64,
    pub conversation_id: String,
    pub workspace_id: String,
    pub workspace_name: String,
    pub timestamp: String,
    pub last_modified: String,
    pub source: Source,
    pub raw_data: Value,
    pub content_hash: String,
}

impl CacheChunk {
    pub fn from_record(record: RawRecord, chunk_id: u64, content_hash: String) -> Self {
        Self {
            chunk_id,
            conversation_id: record.conversation_id,
            workspace_id: record.workspace_id,
            workspace_name: record.workspace_name,
            timestamp: record.timestamp,
            last_modified: record.last_modified,
            source: record.source,
            raw_data: record.raw_data,
            content_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk_serde_camel_case() {
        let chunk = CacheChunk {
            chunk_id: 7,
            conversation_id: "conv-1".to_string(),
            workspace_id: "ws-1".to_string(),
            workspace_name: "alpha".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:05:00Z".to_string(),
            source: Source::Augment,
            raw_data: json!({"request_message": "hi"}),
            content_hash: "deadbeef".to_string(),
        };

        let text = serde_json::to_string(&chunk).unwrap();
        assert!(text.contains("\"chunkId\":7"));
        assert!(text.contains("\"workspaceName\":\"alpha\""));

        let back: CacheChunk = serde_json::from_str(&text).unwrap();
        assert_eq!(back.conversation_id, "conv-1");
        assert_eq!(back.source, Source::Augment);
    }
}
