use crate::conversation::Conversation;
use crate::text::{contains_word, split_sentences};
use aicf_types::{Decision, Impact, truncate_chars};

/// Keywords that qualify a sentence as a decision.
const DECISION_KEYWORDS: [&str; 12] = [
    "decided", "decide", "will", "chose", "choose", "use", "implement", "prefer", "avoid",
    "rejected", "instead", "opted",
];

/// Markers that grade a decision HIGH: it touches structure that outlives
/// the current change.
const HIGH_IMPACT_MARKERS: [&str; 6] = [
    "architecture",
    "architectural",
    "schema",
    "backward compatibility",
    "backwards compatibility",
    "breaking",
];

/// Markers that grade MEDIUM: a component's behavior changes.
const MEDIUM_IMPACT_MARKERS: [&str; 8] = [
    "component",
    "behavior",
    "behaviour",
    "module",
    "interface",
    "api",
    "default",
    "config",
];

/// A sentence must carry this much substance to count as a decision; bare
/// "use it" style fragments do not qualify.
const MIN_DECISION_LEN: usize = 20;

/// Maximum length of the extracted decision text.
pub const MAX_DECISION_LEN: usize = 200;

/// Extract decision sentences from both sides of the conversation.
///
/// The extracted value is always the sentence itself, capped at 200
/// characters, never the surrounding message. The neighbouring sentences
/// ride along as context for the markdown rendering only.
pub fn extract(conversation: &Conversation) -> Vec<Decision> {
    let mut decisions = Vec::new();

    for message in &conversation.messages {
        let timestamp = message
            .timestamp
            .clone()
            .unwrap_or_else(|| conversation.timestamp.clone());
        let sentences = split_sentences(&message.text);

        for (i, sentence) in sentences.iter().enumerate() {
            if sentence.chars().count() < MIN_DECISION_LEN {
                continue;
            }
            if !DECISION_KEYWORDS
                .iter()
                .any(|kw| contains_word(sentence, kw))
            {
                continue;
            }

            let mut context = String::new();
            if i > 0 {
                context.push_str(&sentences[i - 1]);
            }
            if i + 1 < sentences.len() {
                if !context.is_empty() {
                    context.push(' ');
                }
                context.push_str(&sentences[i + 1]);
            }

            decisions.push(Decision {
                timestamp: timestamp.clone(),
                decision: truncate_chars(sentence, MAX_DECISION_LEN),
                impact: grade(sentence),
                context: truncate_chars(&context, 300),
            });
        }
    }

    decisions
}

fn grade(sentence: &str) -> Impact {
    let lower = sentence.to_lowercase();
    if HIGH_IMPACT_MARKERS.iter().any(|m| lower.contains(m)) {
        Impact::High
    } else if MEDIUM_IMPACT_MARKERS.iter().any(|m| lower.contains(m)) {
        Impact::Medium
    } else {
        Impact::Low
    }
}
