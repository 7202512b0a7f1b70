//! Registry error types
//!
//! Error types for connection registry operations.

use super::SessionId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Session is already registered. Session IDs are unique per accepted
    /// connection and each session registers at most once, so this marks an
    /// internal lifecycle bug rather than a client mistake.
    DuplicateSession(SessionId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateSession(id) => {
                write!(f, "Session already registered: {}", id)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
