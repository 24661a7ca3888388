use serde::{Deserialize, Serialize};
use std::fmt;

/// Age tier of a session file. Each tier narrows the schema of the one
/// before it; archive files are never re-compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Sessions,
    Medium,
    Old,
    Archive,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Sessions, Tier::Medium, Tier::Old, Tier::Archive];

    /// Directory name under `.aicf/`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Tier::Sessions => "sessions",
            Tier::Medium => "medium",
            Tier::Old => "old",
            Tier::Archive => "archive",
        }
    }

    /// Tier a session file belongs in given its age in whole days.
    ///
    /// Windows: 0-2 days sessions, 2-7 medium, 7-14 old, 14+ archive.
    /// Negative ages (clock skew, future-dated files) stay in sessions.
    pub fn for_age(age_days: i64) -> Tier {
        if age_days < 2 {
            Tier::Sessions
        } else if age_days < 7 {
            Tier::Medium
        } else if age_days < 14 {
            Tier::Old
        } else {
            Tier::Archive
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
