//! Human-facing rendering of runtime reports.

use aicf_runtime::ops::StatusReport;
use aicf_runtime::{CycleReport, SourceOutcome};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

fn color() -> bool {
    std::io::stdout().is_terminal()
}

pub fn print_cycle_report(report: &CycleReport) {
    if color() {
        println!("{} {}", "cycle".green().bold(), report.summary_line());
    } else {
        println!("cycle {}", report.summary_line());
    }

    for source in &report.sources {
        if source.outcome == SourceOutcome::Ok && (source.records_read > 0 || source.staged > 0) {
            println!(
                "  {}: read={} staged={} dup={}",
                source.source, source.records_read, source.staged, source.duplicates
            );
        }
    }

    // Locked/corrupt sources surface here, alongside per-record skips.
    for diagnostic in report.diagnostics() {
        print_warning(diagnostic);
    }
}

pub fn print_status(report: &StatusReport) {
    if !report.initialized {
        println!("not initialized (run `aicf init`)");
        return;
    }

    println!("recent: {} file(s)", report.recent_files);
    for (tier, count) in &report.tier_files {
        println!("{}: {} file(s)", tier, count);
    }
    println!("polling interval: {}ms", report.polling_interval_ms);

    for source in &report.sources {
        let consent = if source.granted { "granted" } else { "not granted" };
        let enabled = if source.enabled { "enabled" } else { "disabled" };
        let available = if source.available {
            "detected"
        } else {
            "not detected"
        };
        println!(
            "{}: {} / {} / {} / backlog {}",
            source.source, consent, enabled, available, source.cache_backlog
        );
    }
}

pub fn print_warning(message: &str) {
    if color() {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    } else {
        eprintln!("warning: {}", message);
    }
}

pub fn print_ok(message: &str) {
    if color() {
        println!("{} {}", "ok".green().bold(), message);
    } else {
        println!("ok {}", message);
    }
}
