use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A foreign local conversational store for one assistant platform.
///
/// The set is closed; adding a platform means adding a variant here and a
/// reader in aicf-providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    Augment,
    ClaudeCli,
    ClaudeDesktop,
    Warp,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Augment,
        Source::ClaudeCli,
        Source::ClaudeDesktop,
        Source::Warp,
    ];

    /// Stable identifier used in paths (`.cache/llm/<source>/`) and the
    /// permissions log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Augment => "augment",
            Source::ClaudeCli => "claude-cli",
            Source::ClaudeDesktop => "claude-desktop",
            Source::Warp => "warp",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "augment" => Ok(Source::Augment),
            "claude-cli" => Ok(Source::ClaudeCli),
            "claude-desktop" => Ok(Source::ClaudeDesktop),
            "warp" => Ok(Source::Warp),
            other => Err(Error::UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
