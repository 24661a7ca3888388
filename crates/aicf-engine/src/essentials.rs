//! Session essentials: the handful of fields a consolidated session row
//! keeps per conversation.
//!
//! Derivation works from the analysis fields alone. By the time session
//! consolidation runs, the raw conversation is gone (its cache chunk was
//! deleted on materialization), so everything a session row needs must come
//! out of the per-conversation file.

use aicf_types::{AnalysisResult, SessionStatus, truncate_chars};

/// Opening phrases that disqualify a line from being a title or an intent.
/// Deliberately a documented constant: title extraction is only as
/// predictable as this set.
pub const FILLER_OPENERS: [&str; 18] = [
    "ok",
    "okay",
    "yes",
    "no",
    "yep",
    "sure",
    "thanks",
    "thank you",
    "let me",
    "hmm",
    "sounds good",
    "got it",
    "great",
    "cool",
    "nice",
    "alright",
    "continue",
    "go ahead",
];

/// Markers that identify a summary sentence.
const SUMMARY_MARKERS: [&str; 8] = [
    "tldr",
    "tl;dr",
    "in short",
    "in summary",
    "result:",
    "result is",
    "completed",
    "implemented",
];

/// Past-tense completion markers that flip the status to COMPLETED.
const COMPLETION_MARKERS: [&str; 9] = [
    "completed",
    "implemented",
    "fixed",
    "done",
    "finished",
    "created",
    "resolved",
    "merged",
    "shipped",
];

/// A title must carry at least this much substance, or stay empty.
const MIN_TITLE_LEN: usize = 15;

/// How many decisions and actions a session row keeps.
const ESSENTIAL_ITEM_CAP: usize = 3;

#[derive(Debug, Clone)]
pub struct SessionEssentials {
    pub title: String,
    pub summary: String,
    pub decisions: Vec<String>,
    pub actions: Vec<String>,
    pub status: SessionStatus,
}

/// Derive the essentials for one conversation from its analysis.
pub fn derive_essentials(analysis: &AnalysisResult) -> SessionEssentials {
    let mut decisions: Vec<String> = Vec::new();
    for decision in analysis.decisions.iter().take(ESSENTIAL_ITEM_CAP) {
        // Written defensively even though the orchestrator dedups: session
        // rows survive long after the per-conversation files are gone.
        if !decisions.contains(&decision.decision) {
            decisions.push(decision.decision.clone());
        }
    }

    let mut actions: Vec<String> = Vec::new();
    for action in analysis.ai_actions.iter().take(ESSENTIAL_ITEM_CAP) {
        if !actions.contains(&action.details) {
            actions.push(action.details.clone());
        }
    }

    SessionEssentials {
        title: extract_title(analysis),
        summary: extract_summary(analysis),
        decisions,
        actions,
        status: derive_status(analysis),
    }
}

/// Whether a line opens with a filler phrase. The phrase must end at a word
/// boundary: "no" disqualifies "no thanks", not "normalize the parser".
pub fn starts_with_filler(line: &str) -> bool {
    let lower = line.to_lowercase();
    FILLER_OPENERS.iter().any(|filler| {
        lower.strip_prefix(filler).is_some_and(|rest| {
            rest.chars().next().is_none_or(|c| !c.is_alphanumeric())
        })
    })
}

/// First meaningful user intent: skips filler openers, requires
/// `MIN_TITLE_LEN` characters, else empty.
fn extract_title(analysis: &AnalysisResult) -> String {
    for intent in &analysis.user_intents {
        let line = intent.intent.trim();
        if starts_with_filler(line) {
            continue;
        }
        if line.chars().count() >= MIN_TITLE_LEN {
            return truncate_chars(line, 80);
        }
    }
    String::new()
}

/// First extracted sentence containing a summary marker, scanning actions
/// then decisions, else empty.
fn extract_summary(analysis: &AnalysisResult) -> String {
    let action_texts = analysis.ai_actions.iter().map(|a| a.details.as_str());
    let decision_texts = analysis.decisions.iter().map(|d| d.decision.as_str());

    for text in action_texts.chain(decision_texts) {
        let lower = text.to_lowercase();
        if SUMMARY_MARKERS.iter().any(|m| lower.contains(m)) {
            return truncate_chars(text, 160);
        }
    }
    String::new()
}

fn derive_status(analysis: &AnalysisResult) -> SessionStatus {
    let hit = analysis.ai_actions.iter().any(|action| {
        let lower = action.details.to_lowercase();
        COMPLETION_MARKERS.iter().any(|m| lower.contains(m))
            || COMPLETION_MARKERS.contains(&action.kind.as_str())
    });
    if hit {
        SessionStatus::Completed
    } else {
        SessionStatus::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::conversation::{Conversation, Message, Speaker};

    fn analyzed(user: &str, assistant: &str) -> AnalysisResult {
        analyze(&Conversation {
            id: "c".to_string(),
            workspace_name: "alpha".to_string(),
            timestamp: "2025-10-21T09:00:00Z".to_string(),
            last_modified: "2025-10-21T09:00:00Z".to_string(),
            model: None,
            messages: vec![
                Message::new(Speaker::User, user),
                Message::new(Speaker::Assistant, assistant),
            ],
        })
    }

    #[test]
    fn test_title_skips_filler() {
        let essentials = derive_essentials(&analyzed(
            "ok\nlet me think\nmigrate the cache layer to content hashing",
            "On it.",
        ));
        assert_eq!(essentials.title, "migrate the cache layer to content hashing");
    }

    #[test]
    fn test_title_empty_when_everything_is_filler() {
        let essentials = derive_essentials(&analyzed("ok\nyes\nsure", "Fine."));
        assert_eq!(essentials.title, "");
    }

    #[test]
    fn test_filler_match_is_word_bounded() {
        assert!(starts_with_filler("ok let's go"));
        assert!(starts_with_filler("no thanks"));
        assert!(!starts_with_filler("normalize the ingest path"));
        assert!(!starts_with_filler("okra-themed variable names"));
    }

    #[test]
    fn test_summary_finds_marker_sentence() {
        let essentials = derive_essentials(&analyzed(
            "migrate the cache layer please",
            "Implemented content-hash staging for the cache.",
        ));
        assert!(essentials.summary.contains("Implemented content-hash staging"));
    }

    #[test]
    fn test_status_completed_on_past_tense() {
        let essentials = derive_essentials(&analyzed(
            "fix the writer please",
            "Fixed the atomic writer.",
        ));
        assert_eq!(essentials.status, SessionStatus::Completed);
    }

    #[test]
    fn test_status_ongoing_without_markers() {
        let essentials = derive_essentials(&analyzed(
            "what is holding up the rollout",
            "Still investigating options.",
        ));
        assert_eq!(essentials.status, SessionStatus::Ongoing);
    }

    #[test]
    fn test_essentials_cap_and_dedup() {
        let essentials = derive_essentials(&analyzed(
            "tighten the import path",
            "We decided to use one staging dir. We decided to use one staging dir. \
             We chose to keep chunk ids monotonic. We opted to keep renames atomic always.",
        ));
        assert!(essentials.decisions.len() <= 3);
        let unique: std::collections::HashSet<&String> = essentials.decisions.iter().collect();
        assert_eq!(unique.len(), essentials.decisions.len());
    }
}
