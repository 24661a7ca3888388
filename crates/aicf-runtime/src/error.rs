use std::fmt;

/// Result type for aicf-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Reader layer error
    Provider(aicf_providers::Error),

    /// Store layer error
    Store(aicf_store::Error),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// Project store not initialized
    NotInitialized(String),

    /// Another cycle holds the lock; callers exit silently
    LockBusy,

    /// Invalid operation or state
    InvalidOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Provider(err) => write!(f, "Reader error: {}", err),
            Error::Store(err) => write!(f, "Store error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::NotInitialized(msg) => write!(f, "Store not initialized: {}", msg),
            Error::LockBusy => write!(f, "Another cycle holds the lock"),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Provider(err) => Some(err),
            Error::Store(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_)
            | Error::NotInitialized(_)
            | Error::LockBusy
            | Error::InvalidOperation(_) => None,
        }
    }
}

impl From<aicf_providers::Error> for Error {
    fn from(err: aicf_providers::Error) -> Self {
        Error::Provider(err)
    }
}

impl From<aicf_store::Error> for Error {
    fn from(err: aicf_store::Error) -> Self {
        Error::Store(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
