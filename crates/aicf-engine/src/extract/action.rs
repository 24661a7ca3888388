use crate::conversation::Conversation;
use crate::text::{contains_word, split_sentences};
use aicf_types::{AiAction, truncate_chars};
use once_cell::sync::Lazy;
use regex::Regex;

/// Past-tense verbs that mark a completed assistant action.
const PAST_TENSE_VERBS: [&str; 16] = [
    "created",
    "added",
    "fixed",
    "implemented",
    "updated",
    "removed",
    "deleted",
    "refactored",
    "renamed",
    "moved",
    "wrote",
    "installed",
    "configured",
    "generated",
    "replaced",
    "extracted",
];

static FILE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9_\-./]+\.(rs|ts|tsx|js|jsx|py|go|json|toml|yaml|yml|md|sql|sh|css|html)\b")
        .expect("static pattern")
});

/// Scan assistant responses and tool-call logs for concrete actions.
pub fn extract(conversation: &Conversation) -> Vec<AiAction> {
    let mut actions = Vec::new();

    for message in conversation.assistant_messages() {
        let timestamp = message
            .timestamp
            .clone()
            .unwrap_or_else(|| conversation.timestamp.clone());

        for sentence in split_sentences(&message.text) {
            let Some(verb) = PAST_TENSE_VERBS
                .iter()
                .find(|verb| contains_word(&sentence, verb))
            else {
                continue;
            };
            actions.push(AiAction {
                timestamp: timestamp.clone(),
                kind: (*verb).to_string(),
                details: truncate_chars(&sentence, 160),
            });
        }

        for path in FILE_PATH.find_iter(&message.text) {
            actions.push(AiAction {
                timestamp: timestamp.clone(),
                kind: "file".to_string(),
                details: path.as_str().to_string(),
            });
        }

        for tool in &message.tool_calls {
            actions.push(AiAction {
                timestamp: timestamp.clone(),
                kind: "tool-call".to_string(),
                details: tool.clone(),
            });
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Message, Speaker};

    fn assistant_says(text: &str, tools: &[&str]) -> Conversation {
        let mut message = Message::new(Speaker::Assistant, text);
        message.tool_calls = tools.iter().map(|t| t.to_string()).collect();
        Conversation {
            id: "c".to_string(),
            workspace_name: "alpha".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:00:00Z".to_string(),
            model: None,
            messages: vec![message],
        }
    }

    #[test]
    fn test_past_tense_verbs_become_actions() {
        let actions = extract(&assistant_says("Fixed the off-by-one. Added a test.", &[]));
        let kinds: Vec<&str> = actions.iter().map(|a| a.kind.as_str()).collect();
        assert!(kinds.contains(&"fixed"));
        assert!(kinds.contains(&"added"));
    }

    #[test]
    fn test_file_paths_are_captured() {
        let actions = extract(&assistant_says("See src/cache.rs for the change", &[]));
        assert!(actions
            .iter()
            .any(|a| a.kind == "file" && a.details == "src/cache.rs"));
    }

    #[test]
    fn test_tool_calls_are_captured() {
        let actions = extract(&assistant_says("done", &["str-replace-editor", "save-file"]));
        let tools: Vec<&str> = actions
            .iter()
            .filter(|a| a.kind == "tool-call")
            .map(|a| a.details.as_str())
            .collect();
        assert_eq!(tools, vec!["str-replace-editor", "save-file"]);
    }

    #[test]
    fn test_present_tense_is_not_an_action() {
        let actions = extract(&assistant_says("I will create the module now", &[]));
        assert!(actions.iter().all(|a| a.kind != "created"));
    }
}
