use crate::augment::AugmentReader;
use crate::claude_cli::ClaudeCliReader;
use crate::claude_desktop::ClaudeDesktopReader;
use crate::traits::SourceReader;
use crate::warp::WarpReader;
use aicf_types::Source;
use std::path::PathBuf;

/// Where each reader looks for its foreign store.
///
/// Defaults resolve through the platform directories; tests point every root
/// into a temp world instead.
#[derive(Debug, Clone)]
pub struct SourceRoots {
    pub augment_storage_roots: Vec<PathBuf>,
    pub claude_projects_root: PathBuf,
    pub claude_desktop_roots: Vec<PathBuf>,
    pub warp_db_paths: Vec<PathBuf>,
}

impl Default for SourceRoots {
    fn default() -> Self {
        Self {
            augment_storage_roots: AugmentReader::default_roots(),
            claude_projects_root: ClaudeCliReader::default_root(),
            claude_desktop_roots: ClaudeDesktopReader::default_roots(),
            warp_db_paths: WarpReader::default_paths(),
        }
    }
}

/// Construct the reader for one source.
pub fn create_reader(source: Source, roots: &SourceRoots) -> Box<dyn SourceReader> {
    match source {
        Source::Augment => Box::new(AugmentReader::new(roots.augment_storage_roots.clone())),
        Source::ClaudeCli => Box::new(ClaudeCliReader::new(roots.claude_projects_root.clone())),
        Source::ClaudeDesktop => {
            Box::new(ClaudeDesktopReader::new(roots.claude_desktop_roots.clone()))
        }
        Source::Warp => Box::new(WarpReader::new(roots.warp_db_paths.clone())),
    }
}

/// Readers for every known source, in declaration order.
pub fn all_readers(roots: &SourceRoots) -> Vec<Box<dyn SourceReader>> {
    Source::ALL
        .iter()
        .map(|source| create_reader(*source, roots))
        .collect()
}
