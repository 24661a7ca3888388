use std::fmt;

/// Result type for aicf-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the readers layer
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// JSON parsing failed
    Json(serde_json::Error),

    /// Source is not installed on this machine
    Unavailable(String),

    /// Snapshot copy succeeded but the store did not open within the timeout
    Locked(String),

    /// Half or more of a source's records failed to parse
    Corrupt { source: String, failed: usize, total: usize },

    /// SQLite store error
    Sqlite(rusqlite::Error),

    /// LevelDB store error
    LevelDb(String),

    /// Directory traversal error
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Unavailable(msg) => write!(f, "SourceUnavailable: {}", msg),
            Error::Locked(msg) => write!(f, "SourceLocked: {}", msg),
            Error::Corrupt { source, failed, total } => write!(
                f,
                "SourceCorrupt: {} ({} of {} records unreadable)",
                source, failed, total
            ),
            Error::Sqlite(err) => write!(f, "SQLite error: {}", err),
            Error::LevelDb(msg) => write!(f, "LevelDB error: {}", msg),
            Error::WalkDir(err) => write!(f, "Directory traversal error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Sqlite(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Unavailable(_) | Error::Locked(_) | Error::Corrupt { .. } | Error::LevelDb(_) => {
                None
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sqlite(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDir(err)
    }
}
