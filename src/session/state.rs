//! Session state machine
//!
//! Tracks the overall state of a chat session from connection to
//! disconnection. The I/O driver lives in `server::session`; this type holds
//! the data and the guarded phase transitions, so the lifecycle is testable
//! without a socket.

use std::net::SocketAddr;
use std::time::Instant;

use crate::registry::SessionId;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// TCP connected, nothing sent yet
    Connecting,
    /// Name prompt sent, waiting for the name line
    AwaitingName,
    /// Registered and relaying messages
    Active,
    /// Teardown in progress: unregistering and announcing the departure
    Closing,
    /// Session closed
    Closed,
}

/// Complete session state
#[derive(Debug)]
pub struct SessionState {
    /// Unique session ID
    pub id: SessionId,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current phase
    pub phase: SessionPhase,

    /// Connection start time
    pub connected_at: Instant,

    /// Registered display name; absent until registration completes
    name: Option<String>,

    /// Lines accepted from this session and handed to the dispatcher
    pub lines_relayed: u64,

    /// Bytes of message text received from this session
    pub bytes_received: u64,
}

impl SessionState {
    /// Create state for a freshly accepted connection
    pub fn new(id: SessionId, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            phase: SessionPhase::Connecting,
            connected_at: Instant::now(),
            name: None,
            lines_relayed: 0,
            bytes_received: 0,
        }
    }

    /// The prompt went out; now waiting for the name line
    pub fn begin_registration(&mut self) {
        if self.phase == SessionPhase::Connecting {
            self.phase = SessionPhase::AwaitingName;
        }
    }

    /// Name accepted and the session entered the registry
    ///
    /// The name is stored as received after trimming; empty and duplicate
    /// names are permitted.
    pub fn activate(&mut self, name: String) {
        if self.phase == SessionPhase::AwaitingName {
            self.name = Some(name);
            self.phase = SessionPhase::Active;
        }
    }

    /// Start tearing down an active session
    pub fn begin_close(&mut self) {
        if self.phase == SessionPhase::Active {
            self.phase = SessionPhase::Closing;
        }
    }

    /// Final transition, valid from any phase
    ///
    /// A session that never completed registration jumps here directly
    /// without passing through `Closing`; it was never visible to peers.
    pub fn finish_close(&mut self) {
        self.phase = SessionPhase::Closed;
    }

    /// Registered display name, if registration completed
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Check if the session is relaying
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Count one relayed line
    pub fn record_line(&mut self, bytes: usize) {
        self.lines_relayed += 1;
        self.bytes_received += bytes as u64;
    }

    /// Get session duration
    pub fn duration(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }
}
