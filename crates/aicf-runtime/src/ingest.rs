//! The read phase: every enabled source in parallel, each staging into its
//! own cache subdirectory.
//!
//! Parallelism is safe because writers never share a directory; the only
//! shared state is the per-source hash set, loaded once when the writer
//! opens. Reader failures are folded into the source report; only IO
//! failures while staging abort the cycle.

use crate::report::{SourceOutcome, SourceReport};
use crate::{Error, Result};
use aicf_providers::{Error as ProviderError, ProjectScope, SourceReader};
use aicf_store::{CacheWriter, StageResult, StoreLayout};

/// Read one source and stage what it produced.
fn ingest_source(
    layout: &StoreLayout,
    scope: &ProjectScope,
    reader: &dyn SourceReader,
    dry_run: bool,
) -> Result<SourceReport> {
    let source = reader.source();

    if !reader.is_available() {
        return Ok(SourceReport::skipped(source, SourceOutcome::Unavailable));
    }

    let outcome = match reader.read_all(scope) {
        Ok(outcome) => outcome,
        Err(ProviderError::Unavailable(msg)) => {
            return Ok(SourceReport::skipped(source, SourceOutcome::Unavailable)
                .with_diagnostic(msg));
        }
        Err(ProviderError::Locked(msg)) => {
            return Ok(SourceReport::skipped(
                source,
                SourceOutcome::Locked(format!("SourceLocked: {}", msg)),
            ));
        }
        Err(err @ ProviderError::Corrupt { .. }) => {
            return Ok(SourceReport::skipped(
                source,
                SourceOutcome::Corrupt(err.to_string()),
            ));
        }
        Err(other) => return Err(other.into()),
    };

    let mut report = SourceReport {
        source,
        outcome: SourceOutcome::Ok,
        records_read: outcome.records.len(),
        staged: 0,
        duplicates: 0,
        corrupt_skipped: outcome.corrupt_skipped,
        diagnostics: outcome.diagnostics,
    };

    if dry_run {
        return Ok(report);
    }

    let mut writer = CacheWriter::open(layout, source)?;
    for record in outcome.records {
        match writer.stage(record)? {
            StageResult::Written(_) => report.staged += 1,
            StageResult::Duplicate => report.duplicates += 1,
        }
    }

    Ok(report)
}

impl SourceReport {
    fn with_diagnostic(mut self, diagnostic: String) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }
}

/// Run every reader, in parallel threads, one per source.
pub fn ingest(
    layout: &StoreLayout,
    scope: &ProjectScope,
    readers: &[Box<dyn SourceReader>],
    dry_run: bool,
) -> Result<Vec<SourceReport>> {
    let results: Vec<Result<SourceReport>> = std::thread::scope(|s| {
        let handles: Vec<_> = readers
            .iter()
            .map(|reader| {
                s.spawn(move || ingest_source(layout, scope, reader.as_ref(), dry_run))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(Error::Config("reader thread panicked".to_string())))
            })
            .collect()
    });

    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        reports.push(result?);
    }
    Ok(reports)
}
