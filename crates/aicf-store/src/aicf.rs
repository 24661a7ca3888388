//! Render and parse the per-conversation pipe-delimited format.
//!
//! One conversation per file, `YYYY-MM-DD_<conversationId>.aicf`, the date
//! taken from the conversation's own timestamp. Line order is fixed:
//! `version`, `timestamp`, `conversationId`, `contentHash`, then one line
//! per non-empty analysis field.

use crate::{Error, Result};
use aicf_types::{
    AICF_VERSION, AiAction, AnalysisResult, Confidence, Decision, Flow, Impact, Role,
    TechnicalWork, UserIntent, WorkingState, date_partition, escape_field, escape_item,
};

/// Everything one per-conversation file carries.
#[derive(Debug, Clone)]
pub struct ConversationDoc {
    pub timestamp: String,
    pub conversation_id: String,
    pub content_hash: String,
    pub model: Option<String>,
    pub analysis: AnalysisResult,
}

impl ConversationDoc {
    /// File stem shared by the AICF file and its markdown pair.
    pub fn file_stem(&self) -> Option<String> {
        let date = date_partition(&self.timestamp)?;
        Some(format!("{}_{}", date, sanitize_stem(&self.conversation_id)))
    }
}

/// File-name-safe form of a conversation ID.
pub fn sanitize_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

pub fn render(doc: &ConversationDoc) -> String {
    let mut out = String::new();
    out.push_str(&format!("version|{}\n", AICF_VERSION));
    out.push_str(&format!("timestamp|{}\n", escape_field(&doc.timestamp)));
    out.push_str(&format!(
        "conversationId|{}\n",
        escape_field(&doc.conversation_id)
    ));
    out.push_str(&format!("contentHash|{}\n", escape_field(&doc.content_hash)));
    if let Some(model) = &doc.model {
        out.push_str(&format!("aiModel|{}\n", escape_field(model)));
    }

    let analysis = &doc.analysis;
    if !analysis.user_intents.is_empty() {
        let items: Vec<String> = analysis
            .user_intents
            .iter()
            .map(|i| format!("{}|{}|{}", i.timestamp, escape_item(&i.intent), i.confidence))
            .collect();
        out.push_str(&format!("userIntents|{}\n", items.join(";")));
    }
    if !analysis.ai_actions.is_empty() {
        let items: Vec<String> = analysis
            .ai_actions
            .iter()
            .map(|a| {
                format!(
                    "{}|{}|{}",
                    a.timestamp,
                    escape_item(&a.kind),
                    escape_item(&a.details)
                )
            })
            .collect();
        out.push_str(&format!("aiActions|{}\n", items.join(";")));
    }
    if !analysis.technical_work.is_empty() {
        let items: Vec<String> = analysis
            .technical_work
            .iter()
            .map(|t| {
                format!(
                    "{}|{}|{}",
                    t.timestamp,
                    escape_item(&t.kind),
                    escape_item(&t.description)
                )
            })
            .collect();
        out.push_str(&format!("technicalWork|{}\n", items.join(";")));
    }
    if !analysis.decisions.is_empty() {
        let items: Vec<String> = analysis
            .decisions
            .iter()
            .map(|d| format!("{}|{}|{}", d.timestamp, escape_item(&d.decision), d.impact))
            .collect();
        out.push_str(&format!("decisions|{}\n", items.join(";")));
    }
    if let Some(flow) = &analysis.flow {
        out.push_str(&format!(
            "flow|{}|{}|{}\n",
            flow.turn_count,
            flow.dominant_role,
            escape_field(&flow.sequence)
        ));
    }
    if let Some(state) = &analysis.working_state {
        out.push_str(&format!(
            "workingState|{}|{}|{}\n",
            escape_field(&state.current_task),
            escape_field(&state.blockers),
            escape_field(&state.next_action)
        ));
    }

    out
}

/// Strict parser for the grammar above. Unknown keys, wrong arity and
/// out-of-order headers are format errors.
pub fn parse(text: &str) -> Result<ConversationDoc> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let version = header_value(lines.next(), "version")?;
    if version != AICF_VERSION {
        return Err(Error::Format(format!("unsupported version: {}", version)));
    }
    let timestamp = header_value(lines.next(), "timestamp")?;
    let conversation_id = header_value(lines.next(), "conversationId")?;
    let content_hash = header_value(lines.next(), "contentHash")?;

    let mut model = None;
    let mut analysis = AnalysisResult::default();

    for line in lines {
        let (key, rest) = line
            .split_once('|')
            .ok_or_else(|| Error::Format(format!("missing delimiter: {}", line)))?;

        match key {
            "aiModel" => {
                model = Some(rest.to_string());
            }
            "userIntents" => {
                analysis.user_intents = split_items(rest)
                    .map(|item| {
                        let [ts, intent, conf] = item_fields::<3>(item)?;
                        Ok(UserIntent {
                            timestamp: ts.to_string(),
                            intent: intent.to_string(),
                            confidence: Confidence::parse(conf).ok_or_else(|| {
                                Error::Format(format!("bad confidence: {}", conf))
                            })?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
            }
            "aiActions" => {
                analysis.ai_actions = split_items(rest)
                    .map(|item| {
                        let [ts, kind, details] = item_fields::<3>(item)?;
                        Ok(AiAction {
                            timestamp: ts.to_string(),
                            kind: kind.to_string(),
                            details: details.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
            }
            "technicalWork" => {
                analysis.technical_work = split_items(rest)
                    .map(|item| {
                        let [ts, kind, description] = item_fields::<3>(item)?;
                        Ok(TechnicalWork {
                            timestamp: ts.to_string(),
                            kind: kind.to_string(),
                            description: description.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
            }
            "decisions" => {
                analysis.decisions = split_items(rest)
                    .map(|item| {
                        let [ts, decision, impact] = item_fields::<3>(item)?;
                        Ok(Decision {
                            timestamp: ts.to_string(),
                            decision: decision.to_string(),
                            impact: Impact::parse(impact)
                                .ok_or_else(|| Error::Format(format!("bad impact: {}", impact)))?,
                            context: String::new(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
            }
            "flow" => {
                let [turns, role, sequence] = item_fields::<3>(rest)?;
                analysis.flow = Some(Flow {
                    turn_count: turns
                        .parse()
                        .map_err(|_| Error::Format(format!("bad turn count: {}", turns)))?,
                    dominant_role: Role::parse(role)
                        .ok_or_else(|| Error::Format(format!("bad role: {}", role)))?,
                    sequence: sequence.to_string(),
                });
            }
            "workingState" => {
                let [task, blockers, next] = item_fields::<3>(rest)?;
                analysis.working_state = Some(WorkingState {
                    current_task: task.to_string(),
                    blockers: blockers.to_string(),
                    next_action: next.to_string(),
                });
            }
            other => return Err(Error::Format(format!("unknown field: {}", other))),
        }
    }

    Ok(ConversationDoc {
        timestamp,
        conversation_id,
        content_hash,
        model,
        analysis,
    })
}

fn header_value(line: Option<&str>, key: &str) -> Result<String> {
    let line = line.ok_or_else(|| Error::Format(format!("missing {} line", key)))?;
    let (found, value) = line
        .split_once('|')
        .ok_or_else(|| Error::Format(format!("missing delimiter in {} line", key)))?;
    if found != key {
        return Err(Error::Format(format!("expected {} line, got {}", key, found)));
    }
    Ok(value.to_string())
}

fn split_items(rest: &str) -> impl Iterator<Item = &str> {
    rest.split(';').filter(|i| !i.is_empty())
}

fn item_fields<const N: usize>(item: &str) -> Result<[&str; N]> {
    let parts: Vec<&str> = item.splitn(N, '|').collect();
    parts
        .try_into()
        .map_err(|_| Error::Format(format!("expected {} fields: {}", N, item)))
}
