use crate::conversation::{Conversation, Speaker};
use aicf_types::{Flow, Role};

/// Share of turns one side must exceed to dominate the conversation.
const DOMINANCE_RATIO: f64 = 0.6;

/// Build the turn sequence and figure out who drove the conversation.
pub fn extract(conversation: &Conversation) -> Option<Flow> {
    if conversation.messages.is_empty() {
        return None;
    }

    let turn_count = conversation.messages.len();
    let user_turns = conversation
        .messages
        .iter()
        .filter(|m| m.speaker == Speaker::User)
        .count();
    let ai_turns = turn_count - user_turns;

    let sequence = conversation
        .messages
        .iter()
        .map(|m| match m.speaker {
            Speaker::User => "user",
            Speaker::Assistant => "ai",
        })
        .collect::<Vec<_>>()
        .join(",");

    let dominant_role = if user_turns as f64 / turn_count as f64 > DOMINANCE_RATIO {
        Role::User
    } else if ai_turns as f64 / turn_count as f64 > DOMINANCE_RATIO {
        Role::Ai
    } else {
        Role::Balanced
    };

    Some(Flow {
        turn_count,
        dominant_role,
        sequence,
    })
}
