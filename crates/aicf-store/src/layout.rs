//! On-disk layout of the memory store, all paths relative to the project
//! root.

use crate::Result;
use aicf_types::{Source, Tier};
use std::path::{Path, PathBuf};

pub const AICF_DIR: &str = ".aicf";
pub const AI_DIR: &str = ".ai";
pub const CACHE_DIR: &str = ".cache/llm";
pub const LEGACY_DIR: &str = "legacy_memory";
pub const RECENT_DIR: &str = "recent";
pub const PERMISSIONS_FILE: &str = ".permissions.aicf";
pub const CONFIG_FILE: &str = ".watcher-config.json";
pub const LOCK_FILE: &str = ".watcher.lock";

/// Resolves every store path for one project.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    project_root: PathBuf,
}

impl StoreLayout {
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn aicf_dir(&self) -> PathBuf {
        self.project_root.join(AICF_DIR)
    }

    pub fn recent_dir(&self) -> PathBuf {
        self.aicf_dir().join(RECENT_DIR)
    }

    pub fn tier_dir(&self, tier: Tier) -> PathBuf {
        self.aicf_dir().join(tier.dir_name())
    }

    pub fn ai_dir(&self) -> PathBuf {
        self.project_root.join(AI_DIR)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.project_root.join(CACHE_DIR)
    }

    pub fn source_cache_dir(&self, source: Source) -> PathBuf {
        self.cache_dir().join(source.as_str())
    }

    pub fn legacy_dir(&self) -> PathBuf {
        self.project_root.join(LEGACY_DIR)
    }

    pub fn permissions_path(&self) -> PathBuf {
        self.aicf_dir().join(PERMISSIONS_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.aicf_dir().join(CONFIG_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.aicf_dir().join(LOCK_FILE)
    }

    /// Create every directory of the tiered skeleton.
    pub fn ensure_skeleton(&self) -> Result<()> {
        std::fs::create_dir_all(self.recent_dir())?;
        for tier in Tier::ALL {
            std::fs::create_dir_all(self.tier_dir(tier))?;
        }
        std::fs::create_dir_all(self.ai_dir())?;
        for source in Source::ALL {
            std::fs::create_dir_all(self.source_cache_dir(source))?;
        }
        Ok(())
    }

    /// Whether init has run for this project.
    pub fn is_initialized(&self) -> bool {
        self.recent_dir().is_dir() && self.tier_dir(Tier::Sessions).is_dir()
    }

    /// Names inside `.aicf/` that belong to the skeleton; anything else in
    /// the root of `.aicf/` is a pre-migration leftover.
    pub fn is_skeleton_entry(name: &str) -> bool {
        if name == RECENT_DIR
            || name == PERMISSIONS_FILE
            || name == CONFIG_FILE
            || name == LOCK_FILE
        {
            return true;
        }
        Tier::ALL.iter().any(|tier| tier.dir_name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_skeleton_creates_all_tiers() {
        let tmp = TempDir::new().unwrap();
        let layout = StoreLayout::new(tmp.path());
        layout.ensure_skeleton().unwrap();

        assert!(layout.recent_dir().is_dir());
        for tier in Tier::ALL {
            assert!(layout.tier_dir(tier).is_dir());
        }
        assert!(layout.ai_dir().is_dir());
        assert!(layout.source_cache_dir(Source::Augment).is_dir());
        assert!(layout.is_initialized());
    }

    #[test]
    fn test_skeleton_entry_names() {
        assert!(StoreLayout::is_skeleton_entry("recent"));
        assert!(StoreLayout::is_skeleton_entry("sessions"));
        assert!(StoreLayout::is_skeleton_entry(".permissions.aicf"));
        assert!(!StoreLayout::is_skeleton_entry("conversation-memory.md"));
    }
}
