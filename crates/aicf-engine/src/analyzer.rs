//! Composition of the extractors into one result per conversation.
//!
//! This is the single stage that guarantees no array carries the same entry
//! twice; downstream renderers assume that invariant and do not re-check it.

use crate::conversation::Conversation;
use crate::extract;
use aicf_types::AnalysisResult;
use std::collections::HashSet;

/// Run every extractor and deduplicate the result arrays.
pub fn analyze(conversation: &Conversation) -> AnalysisResult {
    let mut result = AnalysisResult {
        user_intents: extract::intent::extract(conversation),
        ai_actions: extract::action::extract(conversation),
        technical_work: extract::technical::extract(conversation),
        decisions: extract::decision::extract(conversation),
        flow: extract::flow::extract(conversation),
        working_state: extract::state::extract(conversation),
    };

    // Dedup key is the rendered display string, case-sensitive, matching
    // how the entries serialize into multi-value fields.
    dedup_by_key(&mut result.user_intents, |i| {
        format!("{}|{}|{}", i.timestamp, i.intent, i.confidence)
    });
    dedup_by_key(&mut result.ai_actions, |a| {
        format!("{}|{}|{}", a.timestamp, a.kind, a.details)
    });
    dedup_by_key(&mut result.technical_work, |t| {
        format!("{}|{}|{}", t.timestamp, t.kind, t.description)
    });
    dedup_by_key(&mut result.decisions, |d| {
        format!("{}|{}|{}", d.timestamp, d.decision, d.impact)
    });

    result
}

fn dedup_by_key<T, F>(items: &mut Vec<T>, key: F)
where
    F: Fn(&T) -> String,
{
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(key(item)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Message, Speaker};

    #[test]
    fn test_arrays_are_deduplicated() {
        // The same exchange twice in one conversation: every derived entry
        // would double without the dedup pass.
        let text = "Fixed the parser in src/parse.rs.";
        let conversation = Conversation {
            id: "c".to_string(),
            workspace_name: "alpha".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:00:00Z".to_string(),
            model: None,
            messages: vec![
                Message::new(Speaker::Assistant, text),
                Message::new(Speaker::Assistant, text),
            ],
        };

        let result = analyze(&conversation);
        let keys: Vec<String> = result
            .ai_actions
            .iter()
            .map(|a| format!("{}|{}|{}", a.timestamp, a.kind, a.details))
            .collect();
        let unique: std::collections::HashSet<&String> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let conversation = Conversation {
            id: "c".to_string(),
            workspace_name: "alpha".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:00:00Z".to_string(),
            model: None,
            messages: vec![
                Message::new(Speaker::Assistant, "Fixed the cache."),
                Message::new(Speaker::Assistant, "fixed the cache."),
            ],
        };

        let result = analyze(&conversation);
        let fixed: Vec<&str> = result
            .ai_actions
            .iter()
            .filter(|a| a.kind == "fixed")
            .map(|a| a.details.as_str())
            .collect();
        assert_eq!(fixed.len(), 2);
    }

    #[test]
    fn test_flow_present_for_nonempty_conversation() {
        let conversation = Conversation {
            id: "c".to_string(),
            workspace_name: "alpha".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:00:00Z".to_string(),
            model: None,
            messages: vec![Message::new(Speaker::User, "implement the watcher loop")],
        };

        let result = analyze(&conversation);
        assert_eq!(result.flow.unwrap().turn_count, 1);
    }
}
