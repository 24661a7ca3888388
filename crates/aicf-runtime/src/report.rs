//! Typed cycle diagnostics.
//!
//! Non-fatal conditions are counted, not thrown: every stage fills its part
//! of the [`CycleReport`] and the CLI renders the one-line summary an
//! operator correlates with source upgrades.

use aicf_types::{Source, Tier};
use chrono::NaiveDate;

/// How one source's read phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Read and staged normally.
    Ok,
    /// Not installed on this machine; skipped silently.
    Unavailable,
    /// Installed but not opted in; skipped silently.
    NotGranted,
    /// Store did not open within the timeout; retried next cycle.
    Locked(String),
    /// Half or more records unreadable; source aborted for this cycle.
    Corrupt(String),
}

#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: Source,
    pub outcome: SourceOutcome,
    pub records_read: usize,
    pub staged: usize,
    pub duplicates: usize,
    pub corrupt_skipped: usize,
    pub diagnostics: Vec<String>,
}

impl SourceReport {
    pub fn skipped(source: Source, outcome: SourceOutcome) -> Self {
        Self {
            source,
            outcome,
            records_read: 0,
            staged: 0,
            duplicates: 0,
            corrupt_skipped: 0,
            diagnostics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsolidationReport {
    pub materialized: usize,
    pub duplicates: usize,
    pub failures: usize,
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub files_written: usize,
    pub absorbed: usize,
    pub duplicates: usize,
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropoffMove {
    pub date: NaiveDate,
    pub from: Tier,
    pub to: Tier,
}

#[derive(Debug, Clone, Default)]
pub struct DropoffReport {
    pub moves: Vec<DropoffMove>,
    pub diagnostics: Vec<String>,
}

/// Everything one cycle did.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub sources: Vec<SourceReport>,
    pub consolidation: ConsolidationReport,
    pub sessions: SessionReport,
    pub dropoff: DropoffReport,
    pub dry_run: bool,
}

impl CycleReport {
    /// The cycle log line: counts of everything non-fatal.
    pub fn summary_line(&self) -> String {
        let read: usize = self.sources.iter().map(|s| s.records_read).sum();
        let staged: usize = self.sources.iter().map(|s| s.staged).sum();
        let source_dups: usize = self.sources.iter().map(|s| s.duplicates).sum();
        let corrupt: usize = self.sources.iter().map(|s| s.corrupt_skipped).sum();
        let locked = self
            .sources
            .iter()
            .filter(|s| matches!(s.outcome, SourceOutcome::Locked(_)))
            .count();

        format!(
            "read={} staged={} dup={} corrupt={} locked={} materialized={} \
             sessions={} absorbed={} dropped={}{}",
            read,
            staged,
            source_dups + self.consolidation.duplicates + self.sessions.duplicates,
            corrupt + self.consolidation.failures,
            locked,
            self.consolidation.materialized,
            self.sessions.files_written,
            self.sessions.absorbed,
            self.dropoff.moves.len(),
            if self.dry_run { " (dry run)" } else { "" },
        )
    }

    /// Every diagnostic from every stage, in pipeline order.
    pub fn diagnostics(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for source in &self.sources {
            if let SourceOutcome::Locked(msg) | SourceOutcome::Corrupt(msg) = &source.outcome {
                out.push(msg.as_str());
            }
            out.extend(source.diagnostics.iter().map(String::as_str));
        }
        out.extend(self.consolidation.diagnostics.iter().map(String::as_str));
        out.extend(self.sessions.diagnostics.iter().map(String::as_str));
        out.extend(self.dropoff.diagnostics.iter().map(String::as_str));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_counts() {
        let mut report = CycleReport::default();
        report.sources.push(SourceReport {
            source: Source::Augment,
            outcome: SourceOutcome::Ok,
            records_read: 5,
            staged: 4,
            duplicates: 1,
            corrupt_skipped: 0,
            diagnostics: Vec::new(),
        });
        report.sources.push(SourceReport::skipped(
            Source::Warp,
            SourceOutcome::Locked("SourceLocked: warp".to_string()),
        ));
        report.consolidation.materialized = 4;

        let line = report.summary_line();
        assert!(line.contains("read=5"));
        assert!(line.contains("staged=4"));
        assert!(line.contains("locked=1"));
        assert!(line.contains("materialized=4"));
    }

    #[test]
    fn test_diagnostics_include_locked_sources() {
        let mut report = CycleReport::default();
        report.sources.push(SourceReport::skipped(
            Source::Augment,
            SourceOutcome::Locked("SourceLocked: augment".to_string()),
        ));
        assert!(report
            .diagnostics()
            .iter()
            .any(|d| d.contains("SourceLocked")));
    }
}
