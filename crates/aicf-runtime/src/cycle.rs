//! One pipeline cycle: ingest, consolidate, sessionize, drop off.
//!
//! The cycle owns every piece of state it needs (layout, scope, readers,
//! reports); nothing lives in module-level singletons. Stages run strictly
//! in order and each stage is replayable from the durable state the one
//! before it left behind.

use crate::consolidate::consolidate_cache;
use crate::dropoff::run_dropoff;
use crate::ingest::ingest;
use crate::lock::CycleLock;
use crate::report::{CycleReport, SourceOutcome, SourceReport};
use crate::sessions::consolidate_sessions;
use crate::{Error, Result};
use aicf_providers::{ProjectScope, SourceRoots, create_reader};
use aicf_store::{PermissionsLog, StoreLayout, WatcherConfig};
use aicf_types::Source;
use chrono::NaiveDate;
use std::path::Path;

/// Per-invocation knobs; everything else comes from the persisted config.
#[derive(Debug, Clone, Default)]
pub struct CycleOptions {
    /// Restrict the cycle to these sources (still gated by permissions).
    pub sources: Option<Vec<Source>>,
    /// Fixed "today" for age arithmetic; defaults to the local date.
    pub today: Option<NaiveDate>,
    /// Where the readers look; defaults to the platform locations.
    pub roots: Option<SourceRoots>,
}

pub fn run_cycle(project_root: &Path, options: &CycleOptions) -> Result<CycleReport> {
    let layout = StoreLayout::new(project_root);
    if !layout.is_initialized() {
        return Err(Error::NotInitialized(format!(
            "run `aicf init` in {} first",
            project_root.display()
        )));
    }

    let _lock = CycleLock::acquire(&layout.lock_path())?;

    let config = WatcherConfig::load_from(&layout.config_path())
        .map_err(|e| Error::Config(e.to_string()))?;
    let permissions = PermissionsLog::new(&layout.permissions_path());

    let scope = match &config.workspace_filter {
        Some(name) => ProjectScope {
            root: project_root.to_path_buf(),
            name: name.clone(),
        },
        None => ProjectScope::new(project_root),
    };

    let roots = options.roots.clone().unwrap_or_default();

    let mut report = CycleReport {
        dry_run: config.dry_run,
        ..Default::default()
    };

    let mut readers = Vec::new();
    for source in Source::ALL {
        if let Some(only) = &options.sources {
            if !only.contains(&source) {
                continue;
            }
        }
        if !config.is_enabled(source) || !permissions.is_granted(source)? {
            report
                .sources
                .push(SourceReport::skipped(source, SourceOutcome::NotGranted));
            continue;
        }
        readers.push(create_reader(source, &roots));
    }

    let mut ingested = ingest(&layout, &scope, &readers, config.dry_run)?;
    report.sources.append(&mut ingested);
    report.sources.sort_by_key(|r| r.source);

    if config.dry_run {
        return Ok(report);
    }

    report.consolidation = consolidate_cache(&layout)?;
    report.sessions = consolidate_sessions(&layout)?;

    let today = options
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    report.dropoff = run_dropoff(&layout, today)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_requires_init() {
        let tmp = tempfile::TempDir::new().unwrap();
        match run_cycle(tmp.path(), &CycleOptions::default()) {
            Err(Error::NotInitialized(_)) => {}
            other => panic!("expected NotInitialized, got {:?}", other.map(|_| ())),
        }
    }
}
