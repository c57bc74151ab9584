//! Error taxonomy (§7).
//!
//! Programmer errors (buffer bounds, an empty logger name) are preconditions
//! and abort via `assert!`/`panic!` rather than living in this enum — see
//! [`crate::buffer::Buffer`] and [`crate::logger::LoggerBuilder::build`].
//! Everything recoverable lives here.

use std::fmt;

/// Errors surfaced by the crate's public API.
#[derive(Debug)]
pub enum ChronicleError {
    /// The config file was missing a required key or had the wrong shape.
    InvalidConfig(String),
    /// A file or network operation failed.
    Io(std::io::Error),
    /// A payload's `printf`-style format string could not be rendered.
    Format(crate::format::FormatError),
    /// The backup TCP hop to the backlog server failed.
    Network(std::io::Error),
    /// A task was submitted to a [`crate::pool::WorkerPool`] after `stop()`.
    PoolStopped,
}

impl fmt::Display for ChronicleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChronicleError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            ChronicleError::Io(e) => write!(f, "io error: {e}"),
            ChronicleError::Format(e) => write!(f, "{e}"),
            ChronicleError::Network(e) => write!(f, "backup network error: {e}"),
            ChronicleError::PoolStopped => write!(f, "worker pool has been stopped"),
        }
    }
}

impl std::error::Error for ChronicleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChronicleError::Io(e) | ChronicleError::Network(e) => Some(e),
            ChronicleError::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<crate::format::FormatError> for ChronicleError {
    fn from(e: crate::format::FormatError) -> Self {
        ChronicleError::Format(e)
    }
}

pub type Result<T> = std::result::Result<T, ChronicleError>;
