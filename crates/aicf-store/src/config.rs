use crate::Result;
use aicf_types::Source;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default watcher cycle trigger: 300 seconds.
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 300_000;

/// `.aicf/.watcher-config.json`.
///
/// The option set is closed; there is no free-form bag. The polling interval
/// gates the cycle trigger only, never a cycle's internal work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatcherConfig {
    #[serde(default = "default_polling_interval")]
    pub polling_interval_ms: u64,
    #[serde(default)]
    pub enabled_sources: Vec<Source>,
    #[serde(default)]
    pub workspace_filter: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_polling_interval() -> u64 {
    DEFAULT_POLLING_INTERVAL_MS
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: DEFAULT_POLLING_INTERVAL_MS,
            enabled_sources: Vec::new(),
            workspace_filter: None,
            dry_run: false,
        }
    }
}

impl WatcherConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: WatcherConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_enabled(&self, source: Source) -> bool {
        self.enabled_sources.contains(&source)
    }

    pub fn enable(&mut self, source: Source) {
        if !self.is_enabled(source) {
            self.enabled_sources.push(source);
        }
    }

    pub fn disable(&mut self, source: Source) {
        self.enabled_sources.retain(|s| *s != source);
    }
}
