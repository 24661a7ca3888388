use crate::args::{CycleArgs, ImportArgs, InitArgs, PermissionsAction, PermissionsArgs, WatchArgs};
use crate::output;
use aicf_providers::{SourceRoots, create_reader};
use aicf_runtime::ops;
use aicf_runtime::{CycleOptions, Error as RuntimeError, WatchOptions};
use aicf_store::{PermissionAction, PermissionsLog, StoreLayout, WatcherConfig};
use aicf_types::Source;
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn init(project_root: &Path, args: InitArgs) -> Result<i32> {
    let mode = if args.manual {
        ops::InitMode::Manual(args.sources.iter().map(|s| Source::from(*s)).collect())
    } else {
        // --automatic is also the default when neither flag is given.
        ops::InitMode::Automatic
    };

    let outcome = ops::init(project_root, mode, args.force, &SourceRoots::default())
        .context("init failed")?;

    if !outcome.created {
        output::print_warning("store already initialized (use --force to re-run)");
        return Ok(0);
    }

    output::print_ok(&format!(
        "initialized {} with {} source(s) enabled",
        project_root.display(),
        outcome.granted.len()
    ));
    for source in &outcome.granted {
        let note = if outcome.undetected.contains(source) {
            " (not detected yet)"
        } else {
            ""
        };
        println!("  enabled {}{}", source, note);
    }
    Ok(0)
}

pub fn migrate(project_root: &Path) -> Result<i32> {
    let outcome = ops::migrate(project_root).context("migrate failed")?;
    if outcome.preserved.is_empty() {
        output::print_ok("nothing to migrate; skeleton in place");
    } else {
        output::print_ok(&format!(
            "preserved {} file(s) in legacy_memory/",
            outcome.preserved.len()
        ));
        for name in &outcome.preserved {
            println!("  {}", name);
        }
    }
    Ok(0)
}

pub fn cycle(project_root: &Path, args: CycleArgs) -> Result<i32> {
    let options = CycleOptions {
        sources: sources_filter(&args.sources),
        today: args.today,
        roots: None,
    };

    match aicf_runtime::run_cycle(project_root, &options) {
        Ok(report) => {
            output::print_cycle_report(&report);
            Ok(0)
        }
        // Concurrency violation: exit silently, by contract.
        Err(RuntimeError::LockBusy) => Ok(0),
        Err(err) => Err(err.into()),
    }
}

pub fn watch(project_root: &Path, args: WatchArgs) -> Result<i32> {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || {
        stop_handler.store(true, Ordering::SeqCst);
    })
    .context("failed to install shutdown handler")?;

    let options = WatchOptions {
        cycle: CycleOptions {
            sources: sources_filter(&args.sources),
            today: None,
            roots: None,
        },
        interval_ms: args.interval,
        once: args.once,
    };

    aicf_runtime::watch(project_root, &options, stop, |report| {
        output::print_cycle_report(report);
    })?;
    Ok(0)
}

pub fn permissions(project_root: &Path, args: PermissionsArgs) -> Result<i32> {
    let layout = StoreLayout::new(project_root);
    let log = PermissionsLog::new(&layout.permissions_path());
    let roots = SourceRoots::default();

    match args.action {
        PermissionsAction::List => {
            let state = log.state()?;
            for source in Source::ALL {
                let consent = match state.get(&source) {
                    Some(PermissionAction::Grant) => "granted",
                    Some(PermissionAction::Revoke) => "revoked",
                    None => "never asked",
                };
                let detected = if create_reader(source, &roots).is_available() {
                    "detected"
                } else {
                    "not detected"
                };
                println!("{}: {} ({})", source, consent, detected);
            }
        }
        PermissionsAction::Grant { source } => {
            let source = Source::from(source);
            let timestamp = chrono::Utc::now().to_rfc3339();
            log.grant(source, &timestamp)?;

            let mut config = WatcherConfig::load_from(&layout.config_path())?;
            config.enable(source);
            config.save_to(&layout.config_path())?;

            output::print_ok(&format!("granted {}", source));
        }
        PermissionsAction::Revoke { source } => {
            let source = Source::from(source);
            let timestamp = chrono::Utc::now().to_rfc3339();
            log.revoke(source, &timestamp)?;

            let mut config = WatcherConfig::load_from(&layout.config_path())?;
            config.disable(source);
            config.save_to(&layout.config_path())?;

            output::print_ok(&format!("revoked {}", source));
        }
    }
    Ok(0)
}

pub fn import(project_root: &Path, args: ImportArgs) -> Result<i32> {
    if !args.file.is_file() {
        bail!("export file not found: {}", args.file.display());
    }

    let outcome = ops::import_export_file(project_root, Source::from(args.source), &args.file)?;
    output::print_ok(&format!(
        "staged {} record(s), {} duplicate(s), {} skipped",
        outcome.staged, outcome.duplicates, outcome.skipped
    ));
    for diagnostic in &outcome.diagnostics {
        output::print_warning(diagnostic);
    }
    Ok(0)
}

pub fn status(project_root: &Path) -> Result<i32> {
    let report = ops::status(project_root, &SourceRoots::default())?;
    output::print_status(&report);
    Ok(0)
}

fn sources_filter(args: &[crate::args::SourceArg]) -> Option<Vec<Source>> {
    if args.is_empty() {
        None
    } else {
        Some(args.iter().map(|s| Source::from(*s)).collect())
    }
}
