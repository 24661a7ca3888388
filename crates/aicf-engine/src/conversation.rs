//! Reconstruction of typed conversations from cache-chunk payloads.
//!
//! Each source stages a different `rawData` shape; this module is the single
//! place that knows them. Accessors stay `Option`-shaped all the way down:
//! a missing field yields an absent message or metadata, never a default
//! that pretends the source said something.

use aicf_types::{CacheChunk, Source};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: Option<String>,
    pub thinking: Option<String>,
    pub tool_calls: Vec<String>,
}

impl Message {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: None,
            thinking: None,
            tool_calls: Vec::new(),
        }
    }
}

/// One conversation with its messages in order.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    pub workspace_name: String,
    pub timestamp: String,
    pub last_modified: String,
    pub model: Option<String>,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Rebuild the conversation a chunk captured. Returns `None` when the
    /// payload holds no usable messages.
    pub fn from_chunk(chunk: &CacheChunk) -> Option<Self> {
        let messages = match chunk.source {
            Source::Augment => augment_messages(&chunk.raw_data),
            Source::ClaudeCli => message_list(&chunk.raw_data),
            Source::ClaudeDesktop | Source::Warp => message_list(&chunk.raw_data)
                .or_else(|| augment_messages(&chunk.raw_data))
                .or_else(|| single_text_message(&chunk.raw_data)),
        }?;

        if messages.is_empty() {
            return None;
        }

        Some(Conversation {
            id: chunk.conversation_id.clone(),
            workspace_name: chunk.workspace_name.clone(),
            timestamp: chunk.timestamp.clone(),
            last_modified: chunk.last_modified.clone(),
            model: model_of(&chunk.raw_data),
            messages,
        })
    }

    pub fn user_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.speaker == Speaker::User)
    }

    pub fn assistant_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.speaker == Speaker::Assistant)
    }
}

/// Augment exchange shape: one request/response pair per record.
fn augment_messages(raw: &Value) -> Option<Vec<Message>> {
    let request = raw.get("request_message").and_then(|v| v.as_str());
    let response = raw.get("response_text").and_then(|v| v.as_str());
    if request.is_none() && response.is_none() {
        return None;
    }

    let timestamp = raw
        .get("timestamp")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    let mut messages = Vec::new();
    if let Some(text) = request {
        let mut message = Message::new(Speaker::User, text);
        message.timestamp = timestamp.clone();
        messages.push(message);
    }
    if let Some(text) = response {
        let mut message = Message::new(Speaker::Assistant, text);
        message.timestamp = timestamp.clone();
        message.tool_calls = node_tool_names(raw.get("response_nodes"));
        messages.push(message);
    }
    Some(messages)
}

/// `messages`-array shape staged by the Claude CLI reader and common to
/// desktop-style payloads.
fn message_list(raw: &Value) -> Option<Vec<Message>> {
    let list = raw.get("messages")?.as_array()?;
    let mut messages = Vec::new();

    for item in list {
        let role = item.get("role").and_then(|v| v.as_str())?;
        let speaker = match role {
            "user" | "human" => Speaker::User,
            "assistant" | "ai" => Speaker::Assistant,
            _ => continue,
        };

        let text = item
            .get("text")
            .or_else(|| item.get("content"))
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let mut message = Message::new(speaker, text);
        message.timestamp = item
            .get("timestamp")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        message.thinking = item
            .get("thinking")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        if let Some(calls) = item.get("toolCalls").and_then(|v| v.as_array()) {
            message.tool_calls = calls
                .iter()
                .filter_map(|c| c.as_str().map(|s| s.to_string()))
                .collect();
        }
        messages.push(message);
    }

    Some(messages)
}

/// Last-resort shape: a payload with a single text field.
fn single_text_message(raw: &Value) -> Option<Vec<Message>> {
    let text = raw
        .get("text")
        .or_else(|| raw.get("content"))
        .and_then(|v| v.as_str())?;
    if text.is_empty() {
        return None;
    }
    Some(vec![Message::new(Speaker::User, text)])
}

fn model_of(raw: &Value) -> Option<String> {
    if let Some(model) = raw
        .get("model_id")
        .or_else(|| raw.get("model"))
        .and_then(|v| v.as_str())
    {
        return Some(model.to_string());
    }

    // Claude CLI carries the model per assistant message.
    raw.get("messages")
        .and_then(|v| v.as_array())
        .and_then(|list| {
            list.iter()
                .find_map(|m| m.get("model").and_then(|v| v.as_str()))
        })
        .map(|s| s.to_string())
}

/// Tool names out of Augment request/response node arrays.
fn node_tool_names(nodes: Option<&Value>) -> Vec<String> {
    let Some(list) = nodes.and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    list.iter()
        .filter_map(|node| {
            node.get("tool_name")
                .or_else(|| node.get("name"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk(source: Source, raw_data: Value) -> CacheChunk {
        CacheChunk {
            chunk_id: 1,
            conversation_id: "c-1".to_string(),
            workspace_id: "ws".to_string(),
            workspace_name: "alpha".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:05:00Z".to_string(),
            source,
            raw_data,
            content_hash: "hash".to_string(),
        }
    }

    #[test]
    fn test_augment_exchange_becomes_two_messages() {
        let raw = json!({
            "request_message": "add retries",
            "response_text": "Implemented retries with backoff.",
            "model_id": "model-x",
            "timestamp": "2025-10-21T09:00:00Z",
            "response_nodes": [{"type": "tool_use", "tool_name": "str-replace-editor"}],
        });

        let conv = Conversation::from_chunk(&chunk(Source::Augment, raw)).unwrap();
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].speaker, Speaker::User);
        assert_eq!(conv.messages[1].tool_calls, vec!["str-replace-editor"]);
        assert_eq!(conv.model.as_deref(), Some("model-x"));
    }

    #[test]
    fn test_claude_cli_message_list() {
        let raw = json!({
            "sessionId": "s-1",
            "messages": [
                {"role": "user", "text": "fix the bug", "timestamp": "2025-10-21T09:00:00Z"},
                {"role": "assistant", "text": "Fixed it.", "model": "m-2",
                 "thinking": "check the index math", "toolCalls": ["save-file"]},
            ],
        });

        let conv = Conversation::from_chunk(&chunk(Source::ClaudeCli, raw)).unwrap();
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[1].thinking.as_deref(), Some("check the index math"));
        assert_eq!(conv.model.as_deref(), Some("m-2"));
    }

    #[test]
    fn test_empty_payload_yields_none() {
        assert!(Conversation::from_chunk(&chunk(Source::ClaudeCli, json!({}))).is_none());
        assert!(Conversation::from_chunk(&chunk(Source::Augment, json!({"other": 1}))).is_none());
    }

    #[test]
    fn test_desktop_single_text_fallback() {
        let raw = json!({"id": "c-2", "text": "lone note", "timestamp": "2025-10-21T09:00:00Z"});
        let conv = Conversation::from_chunk(&chunk(Source::ClaudeDesktop, raw)).unwrap();
        assert_eq!(conv.messages.len(), 1);
    }
}
