use serde::Deserialize;
use serde_json::Value;

/// One line of a Claude CLI session log.
///
/// Only `message`, `user` and `assistant` events carry conversation content;
/// every other event type is ignored. Token usage, thinking blocks, git
/// branch and cwd are kept as metadata for downstream extraction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
}

impl SessionEvent {
    pub fn is_message(&self) -> bool {
        matches!(self.kind.as_str(), "message" | "user" | "assistant")
    }

    pub fn role(&self) -> Option<&str> {
        match self.kind.as_str() {
            "user" => Some("user"),
            "assistant" => Some("assistant"),
            "message" => self.message.as_ref()?.role.as_deref(),
            _ => None,
        }
    }

    /// Content may live on the nested message or directly on the event.
    pub fn content(&self) -> Option<&MessageContent> {
        self.message
            .as_ref()
            .and_then(|m| m.content.as_ref())
            .or(self.content.as_ref())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default)]
    pub usage: Option<Value>,
}

/// `content` comes in two shapes: a bare string, or an array of typed blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    /// Visible text, block texts joined with newlines.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter(|b| b.kind == "text")
                .filter_map(|b| b.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Thinking-block text, if any.
    pub fn thinking(&self) -> Option<String> {
        match self {
            MessageContent::Text(_) => None,
            MessageContent::Blocks(blocks) => {
                let joined = blocks
                    .iter()
                    .filter(|b| b.kind == "thinking")
                    .filter_map(|b| b.thinking.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n");
                if joined.is_empty() { None } else { Some(joined) }
            }
        }
    }

    /// Names of tool_use blocks, in order.
    pub fn tool_calls(&self) -> Vec<String> {
        match self {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter(|b| b.kind == "tool_use")
                .filter_map(|b| b.name.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
