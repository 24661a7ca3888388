//! Session files: one file per calendar day, progressively narrower schemas
//! as the file ages through the tiers.
//!
//! FULL and SUMMARY share the wide schema (SUMMARY only keeps rows with
//! decisions or actions). KEY_POINTS drops title and summary columns.
//! SINGLE_LINE keeps one `TIMESTAMP|TITLE` line per conversation under an
//! `@SESSION` header. The parser is schema-directed: the `@SCHEMA` line
//! names the columns, so one parser reads every sectioned tier.

use crate::{Error, Result};
use aicf_types::{SessionStatus, Tier, escape_field, escape_item};
use chrono::NaiveDate;

pub const FULL_SCHEMA: &str = "C#|TIMESTAMP|TITLE|SUMMARY|AI_MODEL|DECISIONS|ACTIONS|STATUS";
pub const KEY_POINTS_SCHEMA: &str = "C#|TIMESTAMP|AI_MODEL|DECISIONS|ACTIONS|STATUS";

/// One conversation row of a session file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub timestamp: String,
    pub title: String,
    pub summary: String,
    pub model: String,
    pub decisions: Vec<String>,
    pub actions: Vec<String>,
    pub status: SessionStatus,
}

impl SessionRow {
    pub fn has_substance(&self) -> bool {
        !self.decisions.is_empty() || !self.actions.is_empty()
    }
}

/// The bookkeeping block at the end of a sectioned session file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionNotes {
    pub total: usize,
    pub unique: usize,
    pub duration: String,
    pub focus: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionFile {
    pub date: NaiveDate,
    pub rows: Vec<SessionRow>,
    pub notes: SessionNotes,
}

impl SessionFile {
    /// On-disk name for a session day, identical across tiers.
    pub fn file_name(date: NaiveDate) -> String {
        format!("{}-session.aicf", date.format("%Y-%m-%d"))
    }

    /// Recover the session date from a file name.
    pub fn parse_file_date(file_name: &str) -> Option<NaiveDate> {
        let stem = file_name.strip_suffix("-session.aicf")?;
        NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
    }

    /// Project this file onto a narrower tier.
    ///
    /// Projections are mechanical schema narrowings; nothing here targets a
    /// compression ratio. Projecting onto `Sessions` is the identity.
    pub fn project(&self, tier: Tier) -> SessionFile {
        let rows = match tier {
            Tier::Sessions => self.rows.clone(),
            Tier::Medium => self
                .rows
                .iter()
                .filter(|row| row.has_substance())
                .cloned()
                .collect(),
            Tier::Old => self
                .rows
                .iter()
                .map(|row| SessionRow {
                    timestamp: row.timestamp.clone(),
                    title: String::new(),
                    summary: String::new(),
                    model: row.model.clone(),
                    decisions: row.decisions.clone(),
                    actions: row.actions.clone(),
                    status: row.status,
                })
                .collect(),
            Tier::Archive => self.rows.clone(),
        };

        SessionFile {
            date: self.date,
            rows,
            notes: self.notes.clone(),
        }
    }
}

/// Render a session file for the given tier. `today` feeds the age line of
/// the archive header and nothing else.
pub fn render(file: &SessionFile, tier: Tier, today: NaiveDate) -> String {
    match tier {
        Tier::Sessions | Tier::Medium => render_sectioned(file, FULL_SCHEMA),
        Tier::Old => render_sectioned(file, KEY_POINTS_SCHEMA),
        Tier::Archive => render_single_line(file, today),
    }
}

fn render_sectioned(file: &SessionFile, schema: &str) -> String {
    let columns: Vec<&str> = schema.split('|').collect();
    let mut out = String::new();

    out.push_str("@CONVERSATIONS\n");
    out.push_str("@SCHEMA\n");
    out.push_str(schema);
    out.push('\n');
    out.push_str("@DATA\n");

    for (i, row) in file.rows.iter().enumerate() {
        let mut fields = Vec::with_capacity(columns.len());
        for column in &columns {
            let value = match *column {
                "C#" => (i + 1).to_string(),
                "TIMESTAMP" => escape_field(&row.timestamp),
                "TITLE" => escape_field(&row.title),
                "SUMMARY" => escape_field(&row.summary),
                "AI_MODEL" => escape_field(&row.model),
                "DECISIONS" => join_items(&row.decisions),
                "ACTIONS" => join_items(&row.actions),
                "STATUS" => row.status.to_string(),
                other => unreachable!("unknown schema column {}", other),
            };
            fields.push(value);
        }
        out.push_str(&fields.join("|"));
        out.push('\n');
    }

    let notes = &file.notes;
    out.push_str("@NOTES\n");
    out.push_str(&format!("- Session: {}\n", file.date.format("%Y-%m-%d")));
    out.push_str(&format!("- Total conversations: {}\n", notes.total));
    out.push_str(&format!("- Unique conversations: {}\n", notes.unique));
    out.push_str(&format!(
        "- Duplicates removed: {}\n",
        notes.total.saturating_sub(notes.unique)
    ));
    out.push_str(&format!("- Duration: {}\n", notes.duration));
    if let Some(focus) = &notes.focus {
        out.push_str(&format!("- Focus: {}\n", focus));
    }

    out
}

fn render_single_line(file: &SessionFile, today: NaiveDate) -> String {
    let age = (today - file.date).num_days();
    let mut out = format!(
        "@SESSION|{}|Age: {} days\n",
        file.date.format("%Y-%m-%d"),
        age
    );

    for row in &file.rows {
        // A row that aged past the TITLE column falls back to its first
        // decision, keeping the archive line informative.
        let title = if row.title.is_empty() {
            row.decisions.first().cloned().unwrap_or_default()
        } else {
            row.title.clone()
        };
        out.push_str(&format!(
            "{}|{}\n",
            escape_field(&row.timestamp),
            escape_field(&title)
        ));
    }

    out
}

fn join_items(items: &[String]) -> String {
    items
        .iter()
        .map(|i| escape_item(i))
        .collect::<Vec<_>>()
        .join("; ")
}

fn split_joined(value: &str) -> Vec<String> {
    value
        .split("; ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Parse any tier's session file. The date parameter is the fallback when a
/// single-line header is absent, taken from the file name by callers.
pub fn parse(text: &str, file_date: NaiveDate) -> Result<SessionFile> {
    if text.starts_with("@SESSION|") {
        return parse_single_line(text, file_date);
    }
    parse_sectioned(text, file_date)
}

fn parse_sectioned(text: &str, file_date: NaiveDate) -> Result<SessionFile> {
    #[derive(PartialEq)]
    enum Section {
        Preamble,
        Schema,
        Data,
        Notes,
    }

    let mut section = Section::Preamble;
    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::new();
    let mut notes = SessionNotes::default();
    let mut date = file_date;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        match line {
            "@CONVERSATIONS" => continue,
            "@SCHEMA" => {
                section = Section::Schema;
                continue;
            }
            "@DATA" => {
                section = Section::Data;
                continue;
            }
            "@NOTES" => {
                section = Section::Notes;
                continue;
            }
            _ => {}
        }

        match section {
            Section::Preamble => {
                return Err(Error::Format(format!("unexpected preamble line: {}", line)));
            }
            Section::Schema => {
                columns = line.split('|').map(|s| s.to_string()).collect();
            }
            Section::Data => {
                if columns.is_empty() {
                    return Err(Error::Format("data before schema".to_string()));
                }
                rows.push(parse_row(line, &columns)?);
            }
            Section::Notes => {
                if let Some(value) = line.strip_prefix("- Session: ") {
                    date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                        .map_err(|_| Error::Format(format!("bad session date: {}", value)))?;
                } else if let Some(value) = line.strip_prefix("- Total conversations: ") {
                    notes.total = parse_count(value)?;
                } else if let Some(value) = line.strip_prefix("- Unique conversations: ") {
                    notes.unique = parse_count(value)?;
                } else if let Some(value) = line.strip_prefix("- Duration: ") {
                    notes.duration = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("- Focus: ") {
                    notes.focus = Some(value.trim().to_string());
                }
                // "- Duplicates removed" is derived and re-derived at render.
            }
        }
    }

    if columns.is_empty() {
        return Err(Error::Format("missing @SCHEMA section".to_string()));
    }

    Ok(SessionFile { date, rows, notes })
}

fn parse_row(line: &str, columns: &[String]) -> Result<SessionRow> {
    let values: Vec<&str> = line.splitn(columns.len(), '|').collect();
    if values.len() != columns.len() {
        return Err(Error::Format(format!(
            "row has {} fields, schema has {}: {}",
            values.len(),
            columns.len(),
            line
        )));
    }

    let mut row = SessionRow {
        timestamp: String::new(),
        title: String::new(),
        summary: String::new(),
        model: String::new(),
        decisions: Vec::new(),
        actions: Vec::new(),
        status: SessionStatus::Ongoing,
    };

    for (column, value) in columns.iter().zip(values) {
        match column.as_str() {
            "C#" => {}
            "TIMESTAMP" => row.timestamp = value.to_string(),
            "TITLE" => row.title = value.to_string(),
            "SUMMARY" => row.summary = value.to_string(),
            "AI_MODEL" => row.model = value.to_string(),
            "DECISIONS" => row.decisions = split_joined(value),
            "ACTIONS" => row.actions = split_joined(value),
            "STATUS" => {
                row.status = SessionStatus::parse(value)
                    .ok_or_else(|| Error::Format(format!("bad status: {}", value)))?;
            }
            other => {
                return Err(Error::Format(format!("unknown column: {}", other)));
            }
        }
    }

    Ok(row)
}

fn parse_single_line(text: &str, file_date: NaiveDate) -> Result<SessionFile> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| Error::Format("empty archive file".to_string()))?;

    let parts: Vec<&str> = header.splitn(3, '|').collect();
    if parts.len() != 3 || parts[0] != "@SESSION" {
        return Err(Error::Format(format!("bad archive header: {}", header)));
    }
    let date = NaiveDate::parse_from_str(parts[1], "%Y-%m-%d").unwrap_or(file_date);

    let mut rows = Vec::new();
    for line in lines {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let (timestamp, title) = line
            .split_once('|')
            .ok_or_else(|| Error::Format(format!("bad archive row: {}", line)))?;
        rows.push(SessionRow {
            timestamp: timestamp.to_string(),
            title: title.to_string(),
            summary: String::new(),
            model: String::new(),
            decisions: Vec::new(),
            actions: Vec::new(),
            status: SessionStatus::Ongoing,
        });
    }

    Ok(SessionFile {
        date,
        rows,
        notes: SessionNotes {
            total: 0,
            unique: 0,
            duration: String::new(),
            focus: None,
        },
    })
}

fn parse_count(value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Format(format!("bad count: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 21).unwrap()
    }

    fn sample_file() -> SessionFile {
        SessionFile {
            date: date(),
            rows: vec![
                SessionRow {
                    timestamp: "2025-10-21T09:00:00Z".to_string(),
                    title: "migrate the cache layer".to_string(),
                    summary: "Implemented content-hash staging.".to_string(),
                    model: "model-x".to_string(),
                    decisions: vec!["We chose atomic renames.".to_string()],
                    actions: vec!["Created the cache writer.".to_string()],
                    status: SessionStatus::Completed,
                },
                SessionRow {
                    timestamp: "2025-10-21T10:00:00Z".to_string(),
                    title: "idle chat".to_string(),
                    summary: String::new(),
                    model: "model-x".to_string(),
                    decisions: Vec::new(),
                    actions: Vec::new(),
                    status: SessionStatus::Ongoing,
                },
            ],
            notes: SessionNotes {
                total: 3,
                unique: 2,
                duration: "2025-10-21T09:00:00Z..2025-10-21T10:00:00Z".to_string(),
                focus: Some("cache".to_string()),
            },
        }
    }

    #[test]
    fn test_full_render_shape() {
        let text = render(&sample_file(), Tier::Sessions, date());
        assert!(text.starts_with("@CONVERSATIONS\n@SCHEMA\n"));
        assert!(text.contains(FULL_SCHEMA));
        assert!(text.contains("- Total conversations: 3"));
        assert!(text.contains("- Unique conversations: 2"));
        assert!(text.contains("- Duplicates removed: 1"));
        assert!(text.contains("1|2025-10-21T09:00:00Z|migrate the cache layer"));
    }

    #[test]
    fn test_roundtrip_full() {
        let file = sample_file();
        let text = render(&file, Tier::Sessions, date());
        let parsed = parse(&text, date()).unwrap();

        assert_eq!(parsed.date, file.date);
        assert_eq!(parsed.rows, file.rows);
        assert_eq!(parsed.notes.total, 3);
        assert_eq!(parsed.notes.focus.as_deref(), Some("cache"));
    }

    #[test]
    fn test_summary_projection_keeps_substantive_rows() {
        let file = sample_file();
        let summary = file.project(Tier::Medium);

        let expected: Vec<&SessionRow> =
            file.rows.iter().filter(|r| r.has_substance()).collect();
        assert_eq!(summary.rows.len(), expected.len());
        assert_eq!(&summary.rows[0], expected[0]);
    }

    #[test]
    fn test_key_points_drops_title_and_summary() {
        let file = sample_file().project(Tier::Old);
        let text = render(&file, Tier::Old, date());

        assert!(text.contains(KEY_POINTS_SCHEMA));
        assert!(!text.contains("migrate the cache layer"));

        let parsed = parse(&text, date()).unwrap();
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].title, "");
        assert_eq!(parsed.rows[0].decisions, vec!["We chose atomic renames."]);
    }

    #[test]
    fn test_archive_single_line() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        let text = render(&sample_file(), Tier::Archive, today);

        assert!(text.starts_with("@SESSION|2025-10-21|Age: 20 days\n"));
        assert!(text.contains("2025-10-21T09:00:00Z|migrate the cache layer"));

        let parsed = parse(&text, date()).unwrap();
        assert_eq!(parsed.date, date());
        assert_eq!(parsed.rows.len(), 2);
    }

    #[test]
    fn test_archive_title_falls_back_to_decision() {
        let aged = sample_file().project(Tier::Old);
        let text = render(&aged, Tier::Archive, date());
        assert!(text.contains("2025-10-21T09:00:00Z|We chose atomic renames."));
    }

    #[test]
    fn test_file_name_roundtrip() {
        let name = SessionFile::file_name(date());
        assert_eq!(name, "2025-10-21-session.aicf");
        assert_eq!(SessionFile::parse_file_date(&name), Some(date()));
        assert_eq!(SessionFile::parse_file_date("notes.txt"), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("random text\n", date()).is_err());
        assert!(parse("@CONVERSATIONS\n@DATA\n1|x\n", date()).is_err());
    }
}
