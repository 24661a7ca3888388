use crate::conversation::Conversation;
use crate::essentials::starts_with_filler;
use crate::text::contains_word;
use aicf_types::{Confidence, UserIntent, truncate_chars};

/// Imperative openers that signal an explicit request.
const IMPERATIVE_VERBS: [&str; 16] = [
    "add", "fix", "implement", "create", "write", "update", "remove", "delete", "refactor",
    "make", "build", "rename", "move", "change", "extract", "run",
];

/// Question openers that signal an information-seeking intent.
const QUESTION_OPENERS: [&str; 8] = [
    "how do i", "how can i", "how to", "why", "what", "where", "can you", "could you",
];

/// Minimum length for a line to carry an intent at all; anything shorter is
/// an acknowledgement ("ok", "yes") and emits nothing.
const MIN_INTENT_LEN: usize = 15;

/// Classify each user utterance into `(intent, confidence)`.
///
/// The intent is the first meaningful line of the utterance: filler openers,
/// code fences and short acknowledgements are skipped. A message with no
/// meaningful line emits no intent.
pub fn extract(conversation: &Conversation) -> Vec<UserIntent> {
    let mut intents = Vec::new();

    for message in conversation.user_messages() {
        let Some(line) = meaningful_line(&message.text) else {
            continue;
        };

        let confidence = classify(line);
        intents.push(UserIntent {
            timestamp: message
                .timestamp
                .clone()
                .unwrap_or_else(|| conversation.timestamp.clone()),
            intent: truncate_chars(line, 120),
            confidence,
        });
    }

    intents
}

fn meaningful_line(text: &str) -> Option<&str> {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }
        if starts_with_filler(line) {
            continue;
        }
        if line.chars().count() >= MIN_INTENT_LEN {
            return Some(line);
        }
    }
    None
}

fn classify(line: &str) -> Confidence {
    let lower = line.to_lowercase();

    if lower.contains("please") {
        return Confidence::High;
    }
    if let Some(first_word) = lower.split_whitespace().next() {
        if IMPERATIVE_VERBS.contains(&first_word) {
            return Confidence::High;
        }
    }
    if QUESTION_OPENERS
        .iter()
        .any(|opener| lower.starts_with(opener))
        || lower.ends_with('?')
    {
        return Confidence::Medium;
    }
    if IMPERATIVE_VERBS.iter().any(|verb| contains_word(&lower, verb)) {
        return Confidence::Medium;
    }

    Confidence::Low
}
