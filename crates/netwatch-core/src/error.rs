// # Error Types
//
// Unified error type for the netwatch-core library.

use thiserror::Error;

/// Errors that can occur in the connectivity service
#[derive(Error, Debug)]
pub enum Error {
    /// Platform probe query or infrastructure failure
    #[error("probe error: {0}")]
    Probe(String),

    /// The platform denied registration for network events
    #[error("registration denied: {0}")]
    Registration(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error from a platform probe
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),

    /// The notifier task is no longer running
    #[error("connectivity notifier is not running")]
    NotifierStopped,

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn probe(msg: impl Into<String>) -> Self {
        Error::Probe(msg.into())
    }

    pub fn registration(msg: impl Into<String>) -> Self {
        Error::Registration(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

/// Result type alias for netwatch operations
pub type Result<T> = std::result::Result<T, Error>;
