//! A temp world: one project directory plus fake roots for every foreign
//! store, so readers can be pointed entirely inside the sandbox.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestWorld {
    root: TempDir,
}

impl TestWorld {
    pub fn new() -> Result<Self> {
        Ok(Self {
            root: TempDir::new()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Create (or return) a project directory by basename.
    pub fn project_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.path().join("projects").join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// VS Code-style workspace storage root for Augment stores.
    pub fn vscode_storage_root(&self) -> Result<PathBuf> {
        let dir = self.root.path().join("vscode/workspaceStorage");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Claude CLI projects root.
    pub fn claude_projects_root(&self) -> Result<PathBuf> {
        let dir = self.root.path().join("claude/projects");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Claude Desktop store root.
    pub fn desktop_root(&self) -> Result<PathBuf> {
        let dir = self.root.path().join("desktop/Claude");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Path a Warp SQLite database will be seeded at.
    pub fn warp_db_path(&self) -> PathBuf {
        self.root.path().join("warp/warp.sqlite")
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new().expect("temp world")
    }
}
