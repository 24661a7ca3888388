//! Human-readable markdown pair of a per-conversation AICF file.
//!
//! Informational only: nothing parses this back, so the layout favors
//! reading over machine fidelity.

use crate::aicf::ConversationDoc;

pub fn render(doc: &ConversationDoc) -> String {
    let analysis = &doc.analysis;
    let mut out = String::new();

    out.push_str("# Conversation Analysis\n\n");
    out.push_str(&format!("- Conversation: `{}`\n", doc.conversation_id));
    out.push_str(&format!("- Timestamp: {}\n", doc.timestamp));
    out.push_str(&format!("- Content hash: `{}`\n", doc.content_hash));
    if let Some(model) = &doc.model {
        out.push_str(&format!("- Model: {}\n", model));
    }

    if !analysis.user_intents.is_empty() {
        out.push_str("\n## User Intents\n\n");
        for intent in &analysis.user_intents {
            out.push_str(&format!(
                "- {} ({} confidence, {})\n",
                intent.intent, intent.confidence, intent.timestamp
            ));
        }
    }

    if !analysis.ai_actions.is_empty() {
        out.push_str("\n## AI Actions\n\n");
        for action in &analysis.ai_actions {
            out.push_str(&format!("- **{}**: {}\n", action.kind, action.details));
        }
    }

    if !analysis.technical_work.is_empty() {
        out.push_str("\n## Technical Work\n\n");
        for work in &analysis.technical_work {
            out.push_str(&format!("- {}: {}\n", work.kind, work.description));
        }
    }

    if !analysis.decisions.is_empty() {
        out.push_str("\n## Decisions\n\n");
        for decision in &analysis.decisions {
            out.push_str(&format!("- [{}] {}\n", decision.impact, decision.decision));
            if !decision.context.is_empty() {
                out.push_str(&format!("  - context: {}\n", decision.context));
            }
        }
    }

    if let Some(flow) = &analysis.flow {
        out.push_str("\n## Flow\n\n");
        out.push_str(&format!(
            "- {} turns, dominant role {}\n- sequence: {}\n",
            flow.turn_count, flow.dominant_role, flow.sequence
        ));
    }

    if let Some(state) = &analysis.working_state {
        out.push_str("\n## Working State\n\n");
        if !state.current_task.is_empty() {
            out.push_str(&format!("- current task: {}\n", state.current_task));
        }
        if !state.blockers.is_empty() {
            out.push_str(&format!("- blockers: {}\n", state.blockers));
        }
        if !state.next_action.is_empty() {
            out.push_str(&format!("- next action: {}\n", state.next_action));
        }
    }

    out
}
