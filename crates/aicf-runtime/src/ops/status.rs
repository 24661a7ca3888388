use crate::Result;
use aicf_providers::{SourceRoots, create_reader};
use aicf_store::{PermissionAction, PermissionsLog, StoreLayout, WatcherConfig};
use aicf_types::{Source, Tier};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct SourceStatus {
    pub source: Source,
    pub granted: bool,
    pub enabled: bool,
    pub available: bool,
    pub cache_backlog: usize,
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub initialized: bool,
    pub recent_files: usize,
    pub tier_files: Vec<(Tier, usize)>,
    pub sources: Vec<SourceStatus>,
    pub polling_interval_ms: u64,
}

/// Snapshot of the store for `aicf status`.
pub fn status(project_root: &Path, roots: &SourceRoots) -> Result<StatusReport> {
    let layout = StoreLayout::new(project_root);

    if !layout.is_initialized() {
        return Ok(StatusReport {
            initialized: false,
            recent_files: 0,
            tier_files: Tier::ALL.iter().map(|t| (*t, 0)).collect(),
            sources: Vec::new(),
            polling_interval_ms: 0,
        });
    }

    let config = WatcherConfig::load_from(&layout.config_path())
        .map_err(crate::Error::Store)?;
    let permissions = PermissionsLog::new(&layout.permissions_path());
    let state = permissions.state().map_err(crate::Error::Store)?;

    let mut sources = Vec::new();
    for source in Source::ALL {
        sources.push(SourceStatus {
            source,
            granted: matches!(state.get(&source), Some(PermissionAction::Grant)),
            enabled: config.is_enabled(source),
            available: create_reader(source, roots).is_available(),
            cache_backlog: count_chunks(&layout.source_cache_dir(source)),
        });
    }

    Ok(StatusReport {
        initialized: true,
        recent_files: count_files(&layout.recent_dir(), "aicf"),
        tier_files: Tier::ALL
            .iter()
            .map(|t| (*t, count_files(&layout.tier_dir(*t), "aicf")))
            .collect(),
        sources,
        polling_interval_ms: config.polling_interval_ms,
    })
}

fn count_chunks(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.starts_with("chunk-") && name.ends_with(".json")
        })
        .count()
}

fn count_files(dir: &Path, extension: &str) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == extension)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_on_uninitialized_project() {
        let tmp = tempfile::TempDir::new().unwrap();
        let report = status(tmp.path(), &SourceRoots::default()).unwrap();
        assert!(!report.initialized);
    }

    #[test]
    fn test_status_counts_tiers() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        layout.ensure_skeleton().unwrap();
        std::fs::write(
            layout.tier_dir(Tier::Sessions).join("2025-10-21-session.aicf"),
            "",
        )
        .unwrap();

        let report = status(tmp.path(), &SourceRoots::default()).unwrap();
        assert!(report.initialized);
        let sessions = report
            .tier_files
            .iter()
            .find(|(t, _)| *t == Tier::Sessions)
            .unwrap();
        assert_eq!(sessions.1, 1);
    }
}
