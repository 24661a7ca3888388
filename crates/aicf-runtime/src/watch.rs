//! The long-running watcher: one cycle per polling interval.
//!
//! The interval gates only the trigger; a cycle's internal work is never
//! throttled. Cancellation lands between cycles, never inside one.

use crate::cycle::{CycleOptions, run_cycle};
use crate::report::CycleReport;
use crate::{Error, Result};
use aicf_store::{StoreLayout, WatcherConfig};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const SHUTDOWN_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub cycle: CycleOptions,
    /// Override the configured polling interval.
    pub interval_ms: Option<u64>,
    /// Run exactly one cycle and return.
    pub once: bool,
}

/// Run cycles until `stop` flips. Each report is handed to `on_report`
/// before the next sleep.
pub fn watch<F>(
    project_root: &Path,
    options: &WatchOptions,
    stop: Arc<AtomicBool>,
    mut on_report: F,
) -> Result<()>
where
    F: FnMut(&CycleReport),
{
    let layout = StoreLayout::new(project_root);

    loop {
        match run_cycle(project_root, &options.cycle) {
            Ok(report) => on_report(&report),
            // Another invocation holds the lock; this trigger is skipped
            // silently and the watcher waits for the next one.
            Err(Error::LockBusy) => {}
            Err(other) => return Err(other),
        }

        if options.once || stop.load(Ordering::SeqCst) {
            return Ok(());
        }

        // Re-read the interval each round so config edits land without a
        // restart.
        let interval_ms = match options.interval_ms {
            Some(ms) => ms,
            None => WatcherConfig::load_from(&layout.config_path())
                .map(|c| c.polling_interval_ms)
                .unwrap_or(aicf_store::DEFAULT_POLLING_INTERVAL_MS),
        };

        let deadline = std::time::Instant::now() + Duration::from_millis(interval_ms);
        while std::time::Instant::now() < deadline {
            if stop.load(Ordering::SeqCst) {
                return Ok(());
            }
            std::thread::sleep(SHUTDOWN_POLL);
        }
    }
}
