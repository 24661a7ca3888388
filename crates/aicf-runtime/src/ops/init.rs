use crate::Result;
use aicf_providers::{SourceRoots, create_reader};
use aicf_store::{PermissionsLog, StoreLayout, WatcherConfig};
use aicf_types::Source;
use std::path::Path;

#[derive(Debug, Clone)]
pub enum InitMode {
    /// Enable every source detectable on this machine.
    Automatic,
    /// Enable exactly the listed sources.
    Manual(Vec<Source>),
}

#[derive(Debug, Clone)]
pub struct InitOutcome {
    /// False when the store already existed and `force` was not given.
    pub created: bool,
    pub granted: Vec<Source>,
    /// Sources requested or probed but not detectable right now.
    pub undetected: Vec<Source>,
}

/// Create the store skeleton and record consent.
pub fn init(
    project_root: &Path,
    mode: InitMode,
    force: bool,
    roots: &SourceRoots,
) -> Result<InitOutcome> {
    let layout = StoreLayout::new(project_root);

    if layout.is_initialized() && !force {
        return Ok(InitOutcome {
            created: false,
            granted: Vec::new(),
            undetected: Vec::new(),
        });
    }

    layout.ensure_skeleton().map_err(crate::Error::Store)?;

    let (to_grant, undetected) = match mode {
        InitMode::Automatic => {
            let mut available = Vec::new();
            let mut missing = Vec::new();
            for source in Source::ALL {
                if create_reader(source, roots).is_available() {
                    available.push(source);
                } else {
                    missing.push(source);
                }
            }
            (available, missing)
        }
        InitMode::Manual(sources) => {
            let missing = sources
                .iter()
                .copied()
                .filter(|s| !create_reader(*s, roots).is_available())
                .collect();
            (sources, missing)
        }
    };

    let permissions = PermissionsLog::new(&layout.permissions_path());
    let timestamp = chrono::Utc::now().to_rfc3339();
    let mut config = WatcherConfig::load_from(&layout.config_path())
        .map_err(crate::Error::Store)?;

    for source in &to_grant {
        permissions
            .grant(*source, &timestamp)
            .map_err(crate::Error::Store)?;
        config.enable(*source);
    }
    config
        .save_to(&layout.config_path())
        .map_err(crate::Error::Store)?;

    Ok(InitOutcome {
        created: true,
        granted: to_grant,
        undetected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn empty_roots(base: &Path) -> SourceRoots {
        SourceRoots {
            augment_storage_roots: vec![base.join("vscode")],
            claude_projects_root: base.join("claude/projects"),
            claude_desktop_roots: vec![base.join("desktop")],
            warp_db_paths: vec![PathBuf::from(base.join("warp.sqlite"))],
        }
    }

    #[test]
    fn test_init_creates_skeleton_and_grants() {
        let tmp = tempfile::TempDir::new().unwrap();
        let project = tmp.path().join("alpha");
        std::fs::create_dir_all(&project).unwrap();
        let roots = empty_roots(tmp.path());

        let outcome = init(
            &project,
            InitMode::Manual(vec![Source::ClaudeCli]),
            false,
            &roots,
        )
        .unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.granted, vec![Source::ClaudeCli]);
        // Nothing is detectable in an empty world.
        assert_eq!(outcome.undetected, vec![Source::ClaudeCli]);

        let layout = StoreLayout::new(&project);
        assert!(layout.is_initialized());
        assert!(
            PermissionsLog::new(&layout.permissions_path())
                .is_granted(Source::ClaudeCli)
                .unwrap()
        );
        assert!(
            WatcherConfig::load_from(&layout.config_path())
                .unwrap()
                .is_enabled(Source::ClaudeCli)
        );
    }

    #[test]
    fn test_second_init_is_a_noop_without_force() {
        let tmp = tempfile::TempDir::new().unwrap();
        let project = tmp.path().join("alpha");
        std::fs::create_dir_all(&project).unwrap();
        let roots = empty_roots(tmp.path());

        init(&project, InitMode::Manual(vec![]), false, &roots).unwrap();
        let second = init(&project, InitMode::Manual(vec![]), false, &roots).unwrap();
        assert!(!second.created);

        let third = init(&project, InitMode::Manual(vec![]), true, &roots).unwrap();
        assert!(third.created);
    }
}
