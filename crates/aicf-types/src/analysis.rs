//! Structured fields extracted from one conversation.
//!
//! Every field of [`AnalysisResult`] is optional content-wise (empty lists,
//! empty strings) but the shape is fixed. The orchestrator in aicf-engine
//! guarantees that no list contains the same entry twice before a result
//! leaves the analysis stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence grade attached to an extracted user intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Impact grade attached to an extracted decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "HIGH",
            Impact::Medium => "MEDIUM",
            Impact::Low => "LOW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HIGH" => Some(Impact::High),
            "MEDIUM" => Some(Impact::Medium),
            "LOW" => Some(Impact::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dominant role of a conversation's turn sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
    Balanced,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Ai => "ai",
            Role::Balanced => "balanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "ai" => Some(Role::Ai),
            "balanced" => Some(Role::Balanced),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion status of a consolidated conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Completed,
    Ongoing,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Ongoing => "ONGOING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "COMPLETED" => Some(SessionStatus::Completed),
            "ONGOING" => Some(SessionStatus::Ongoing),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIntent {
    pub timestamp: String,
    pub intent: String,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAction {
    pub timestamp: String,
    pub kind: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalWork {
    pub timestamp: String,
    pub kind: String,
    pub description: String,
}

/// A single-sentence decision, never the full message body.
///
/// `decision` is capped at 200 characters by the extractor; `context` carries
/// the surrounding window for the markdown rendering only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub timestamp: String,
    pub decision: String,
    pub impact: Impact,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub turn_count: usize,
    pub dominant_role: Role,
    pub sequence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingState {
    pub current_task: String,
    pub blockers: String,
    pub next_action: String,
}

/// Everything the analysis stage extracts from one conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub user_intents: Vec<UserIntent>,
    pub ai_actions: Vec<AiAction>,
    pub technical_work: Vec<TechnicalWork>,
    pub decisions: Vec<Decision>,
    pub flow: Option<Flow>,
    pub working_state: Option<WorkingState>,
}

impl AnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.user_intents.is_empty()
            && self.ai_actions.is_empty()
            && self.technical_work.is_empty()
            && self.decisions.is_empty()
            && self.flow.is_none()
            && self.working_state.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_uppercase_forms() {
        assert_eq!(Impact::High.as_str(), "HIGH");
        assert_eq!(Impact::parse("MEDIUM"), Some(Impact::Medium));
        assert_eq!(Impact::parse("medium"), None);
    }

    #[test]
    fn test_confidence_lowercase_forms() {
        assert_eq!(Confidence::Low.as_str(), "low");
        assert_eq!(Confidence::parse("high"), Some(Confidence::High));
    }

    #[test]
    fn test_empty_result() {
        assert!(AnalysisResult::default().is_empty());
    }
}
