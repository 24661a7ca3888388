use crate::conversation::Conversation;
use crate::text::split_sentences;
use aicf_types::{WorkingState, truncate_chars};

const TASK_MARKERS: [&str; 3] = ["working on", "current task", "currently"];
const BLOCKER_MARKERS: [&str; 4] = ["blocker", "blocked", "stuck on", "waiting on"];
const NEXT_MARKERS: [&str; 4] = ["todo", "next step", "next:", "next we"];

/// Fill the working state from explicit markers in the conversation.
///
/// Returns `None` when no marker appears anywhere; an all-empty state says
/// less than no state at all.
pub fn extract(conversation: &Conversation) -> Option<WorkingState> {
    let mut state = WorkingState::default();

    for message in &conversation.messages {
        for sentence in split_sentences(&message.text) {
            let lower = sentence.to_lowercase();

            if state.current_task.is_empty()
                && TASK_MARKERS.iter().any(|m| lower.contains(m))
            {
                state.current_task = truncate_chars(&sentence, 160);
            }
            if state.blockers.is_empty() && BLOCKER_MARKERS.iter().any(|m| lower.contains(m)) {
                state.blockers = truncate_chars(&sentence, 160);
            }
            if state.next_action.is_empty() && NEXT_MARKERS.iter().any(|m| lower.contains(m)) {
                state.next_action = truncate_chars(&sentence, 160);
            }
        }
    }

    if state == WorkingState::default() {
        None
    } else {
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Message, Speaker};

    fn conversation(text: &str) -> Conversation {
        Conversation {
            id: "c".to_string(),
            workspace_name: "alpha".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:00:00Z".to_string(),
            model: None,
            messages: vec![Message::new(Speaker::User, text)],
        }
    }

    #[test]
    fn test_markers_fill_fields() {
        let state = extract(&conversation(
            "I'm working on the import path. Blocked on the schema review. TODO: wire up the CLI.",
        ))
        .unwrap();
        assert!(state.current_task.contains("working on the import path"));
        assert!(state.blockers.contains("Blocked on the schema review"));
        assert!(state.next_action.contains("wire up the CLI"));
    }

    #[test]
    fn test_no_markers_yields_none() {
        assert!(extract(&conversation("just chatting about the weather")).is_none());
    }

    #[test]
    fn test_first_marker_wins() {
        let state = extract(&conversation(
            "TODO: first item. TODO: second item.",
        ))
        .unwrap();
        assert!(state.next_action.contains("first item"));
    }
}
