//! Session consolidation: collapse `recent/` into at most one file per
//! calendar day.
//!
//! Only `recent/` is consumed. Session files older than the recent window
//! are never re-derived, even if edited by hand; their per-conversation
//! inputs were deleted on absorption and there is nothing to re-derive them
//! from.

use crate::Result;
use crate::report::SessionReport;
use aicf_engine::derive_essentials;
use aicf_store::{
    ConversationDoc, SessionFile, SessionNotes, SessionRow, StoreLayout, aicf, session,
    write_atomic,
};
use aicf_types::Tier;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;

struct RecentEntry {
    aicf_path: PathBuf,
    md_path: PathBuf,
    doc: ConversationDoc,
}

pub fn consolidate_sessions(layout: &StoreLayout) -> Result<SessionReport> {
    let mut report = SessionReport::default();

    let mut groups: BTreeMap<NaiveDate, Vec<RecentEntry>> = BTreeMap::new();

    let Ok(entries) = std::fs::read_dir(layout.recent_dir()) else {
        return Ok(report);
    };
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_none_or(|e| e != "aicf") {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();

        let Some(date) = file_date(&name) else {
            report
                .diagnostics
                .push(format!("recent/ file with no date prefix: {}", name));
            continue;
        };

        let text = std::fs::read_to_string(&path)?;
        let doc = match aicf::parse(&text) {
            Ok(doc) => doc,
            Err(err) => {
                report
                    .diagnostics
                    .push(format!("unparseable file in recent/: {}: {}", name, err));
                continue;
            }
        };

        let stem = name.trim_end_matches(".aicf").to_string();
        groups.entry(date).or_default().push(RecentEntry {
            aicf_path: path,
            md_path: layout.ai_dir().join(format!("{}.md", stem)),
            doc,
        });
    }

    for (date, mut group) in groups {
        let total = group.len();
        group.sort_by(|a, b| a.doc.timestamp.cmp(&b.doc.timestamp));

        // Duplicates arise when two polling cycles or two sources capture
        // the same raw event; the content hash is the arbiter.
        let mut seen_hashes = std::collections::HashSet::new();
        let mut unique: Vec<&RecentEntry> = Vec::new();
        for entry in &group {
            if seen_hashes.insert(entry.doc.content_hash.clone()) {
                unique.push(entry);
            }
        }
        let duplicates = total - unique.len();

        let new_rows: Vec<SessionRow> = unique.iter().map(|entry| row_of(&entry.doc)).collect();
        let focus = dominant_focus(&unique);

        let session_path = layout
            .tier_dir(Tier::Sessions)
            .join(SessionFile::file_name(date));

        let merged = match std::fs::read_to_string(&session_path) {
            Ok(existing_text) => {
                let existing = session::parse(&existing_text, date)?;
                merge(existing, new_rows, total, focus)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                build(date, new_rows, total, focus)
            }
            Err(err) => return Err(err.into()),
        };

        let text = session::render(&merged, Tier::Sessions, date);
        write_atomic(&session_path, &text)?;

        for entry in &group {
            std::fs::remove_file(&entry.aicf_path)?;
            if entry.md_path.exists() {
                std::fs::remove_file(&entry.md_path)?;
            }
        }

        report.files_written += 1;
        report.absorbed += total;
        report.duplicates += duplicates;
    }

    Ok(report)
}

fn file_date(name: &str) -> Option<NaiveDate> {
    let prefix = name.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

fn row_of(doc: &ConversationDoc) -> SessionRow {
    let essentials = derive_essentials(&doc.analysis);
    SessionRow {
        timestamp: doc.timestamp.clone(),
        title: essentials.title,
        summary: essentials.summary,
        model: doc.model.clone().unwrap_or_default(),
        decisions: essentials.decisions,
        actions: essentials.actions,
        status: essentials.status,
    }
}

/// Most common architectural category across the day's conversations.
fn dominant_focus(entries: &[&RecentEntry]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in entries {
        for work in &entry.doc.analysis.technical_work {
            if work.kind == "category" {
                *counts.entry(work.description.as_str()).or_default() += 1;
            }
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(name, _)| name.to_string())
}

fn build(
    date: NaiveDate,
    rows: Vec<SessionRow>,
    total: usize,
    focus: Option<String>,
) -> SessionFile {
    let unique = rows.len();
    let duration = duration_of(&rows);
    SessionFile {
        date,
        rows,
        notes: SessionNotes {
            total,
            unique,
            duration,
            focus,
        },
    }
}

/// Fold freshly consolidated rows into a session file written by an earlier
/// cycle the same day. A row with the same timestamp is the same
/// conversation, re-captured after it grew; the newer row wins.
fn merge(
    existing: SessionFile,
    new_rows: Vec<SessionRow>,
    new_total: usize,
    focus: Option<String>,
) -> SessionFile {
    let mut by_timestamp: BTreeMap<String, SessionRow> = BTreeMap::new();
    for row in existing.rows {
        by_timestamp.insert(row.timestamp.clone(), row);
    }
    for row in new_rows {
        by_timestamp.insert(row.timestamp.clone(), row);
    }

    let rows: Vec<SessionRow> = by_timestamp.into_values().collect();
    let duration = duration_of(&rows);
    let unique = rows.len();

    SessionFile {
        date: existing.date,
        rows,
        notes: SessionNotes {
            total: existing.notes.total + new_total,
            unique,
            duration,
            focus: focus.or(existing.notes.focus),
        },
    }
}

fn duration_of(rows: &[SessionRow]) -> String {
    match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => format!("{}..{}", first.timestamp, last.timestamp),
        _ => String::new(),
    }
}
