//! Crate-level error types
//!
//! Per-connection failures are handled inside the owning session and never
//! escape to other sessions; these types cover the listener, the registry
//! contract, and client-side misuse.

use crate::registry::RegistryError;

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Transport or listener I/O failure
    Io(std::io::Error),

    /// Registry contract violation
    Registry(RegistryError),

    /// Client operation attempted without a live connection
    NotConnected,

    /// Client connection attempt timed out
    ConnectTimeout,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::NotConnected => write!(f, "Not connected"),
            Error::ConnectTimeout => write!(f, "Connection attempt timed out"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Registry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Error::Registry(err)
    }
}
