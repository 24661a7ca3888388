use crate::Result;
use aicf_types::RawRecord;
use aicf_types::Source;
use std::path::{Path, PathBuf};

/// The project whose conversations are being collected.
///
/// `name` is the directory basename and is the value every reader matches
/// workspace names against. Matching is exact, never substring: substring
/// matching leaks neighbouring projects (`alpha` would also collect
/// `alpha-experiments`).
#[derive(Debug, Clone)]
pub struct ProjectScope {
    pub root: PathBuf,
    pub name: String,
}

impl ProjectScope {
    pub fn new(root: &Path) -> Self {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            root: root.to_path_buf(),
            name,
        }
    }

    /// Exact workspace-name check used by every reader.
    pub fn matches_workspace(&self, workspace_name: &str) -> bool {
        !self.name.is_empty() && workspace_name == self.name
    }
}

/// What one source produced for one read pass.
///
/// Individual unreadable records never abort a read; they are skipped and
/// counted here, with a diagnostic line each, so the cycle report can
/// summarize them.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub records: Vec<RawRecord>,
    pub corrupt_skipped: usize,
    pub diagnostics: Vec<String>,
}

impl ReadOutcome {
    pub fn skip(&mut self, diagnostic: String) {
        self.corrupt_skipped += 1;
        self.diagnostics.push(diagnostic);
    }
}

/// Contract every foreign-store reader implements.
///
/// Readers are read-only over snapshot copies; they never touch the live
/// store path of the owning application.
pub trait SourceReader: Send + Sync {
    /// Which platform this reader extracts from.
    fn source(&self) -> Source;

    /// Whether the platform appears to be installed on this machine.
    fn is_available(&self) -> bool;

    /// Extract every conversation record belonging to `project`.
    fn read_all(&self, project: &ProjectScope) -> Result<ReadOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_name_is_basename() {
        let scope = ProjectScope::new(Path::new("/home/user/alpha"));
        assert_eq!(scope.name, "alpha");
    }

    #[test]
    fn test_workspace_match_is_exact() {
        let scope = ProjectScope::new(Path::new("/home/user/alpha"));
        assert!(scope.matches_workspace("alpha"));
        assert!(!scope.matches_workspace("alpha-experiments"));
        assert!(!scope.matches_workspace("alph"));
        assert!(!scope.matches_workspace("my-alpha"));
    }

    #[test]
    fn test_empty_scope_matches_nothing() {
        let scope = ProjectScope {
            root: PathBuf::from("/"),
            name: String::new(),
        };
        assert!(!scope.matches_workspace(""));
    }
}
