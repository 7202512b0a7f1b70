//! Broadcast message types for line routing
//!
//! This module defines the unit handed to the dispatcher: the originating
//! session (if any) plus the fully rendered wire line.

use bytes::Bytes;

use super::SessionId;

/// A line to be broadcast to registered sessions
///
/// Rendering happens once in the constructor; delivery to each recipient
/// clones only the `Bytes` reference, so a fan-out shares one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Session the line originated from. Delivery skips this session;
    /// `None` marks a line with no origin left to exclude.
    origin: Option<SessionId>,
    /// Rendered UTF-8 line, without the terminator
    line: Bytes,
}

impl Message {
    /// Create a chat line relayed on behalf of a named sender
    pub fn chat(origin: SessionId, name: &str, text: &str) -> Self {
        Self {
            origin: Some(origin),
            line: Bytes::from(format!("{}: {}", name, text)),
        }
    }

    /// Create a join announcement, excluded from the joining session itself
    pub fn joined(origin: SessionId, name: &str) -> Self {
        Self {
            origin: Some(origin),
            line: Bytes::from(format!("{} joined the chat", name)),
        }
    }

    /// Create a departure announcement
    ///
    /// The leaver is unregistered before this is dispatched, so there is no
    /// origin to exclude.
    pub fn departed(name: &str) -> Self {
        Self {
            origin: None,
            line: Bytes::from(format!("{} left the chat", name)),
        }
    }

    /// Create a system line without a sender prefix
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            origin: None,
            line: Bytes::from(text.into()),
        }
    }

    /// Session to exclude from delivery, if any
    pub fn origin(&self) -> Option<SessionId> {
        self.origin
    }

    /// Rendered line bytes, without the newline terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.line
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.line))
    }
}
