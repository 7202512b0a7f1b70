//! Statistics and counters for the chat server

use std::sync::atomic::{AtomicU64, Ordering};

/// Server-wide counters
///
/// Shared between the listener, the sessions, and the dispatcher, so each
/// counter is an atomic updated with relaxed ordering. Use [`snapshot`] for
/// a consistent-enough copy to display.
///
/// [`snapshot`]: ServerStats::snapshot
#[derive(Debug, Default)]
pub struct ServerStats {
    /// Connections accepted since start
    total_connections: AtomicU64,
    /// Connections currently open
    active_connections: AtomicU64,
    /// Name registrations completed since start
    names_registered: AtomicU64,
    /// Sender lines accepted for broadcast
    messages_relayed: AtomicU64,
    /// Per-recipient deliveries that succeeded
    lines_delivered: AtomicU64,
    /// Per-recipient deliveries that failed
    delivery_failures: AtomicU64,
}

impl ServerStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an accepted connection
    pub fn record_connection(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a finished connection
    pub fn record_disconnection(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    /// Count a completed name registration
    pub fn record_join(&self) {
        self.names_registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a sender line accepted for broadcast
    pub fn record_relayed(&self) {
        self.messages_relayed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one successful per-recipient delivery
    pub fn record_delivery(&self) {
        self.lines_delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one failed per-recipient delivery
    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            names_registered: self.names_registered.load(Ordering::Relaxed),
            messages_relayed: self.messages_relayed.load(Ordering::Relaxed),
            lines_delivered: self.lines_delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the server counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Connections accepted since start
    pub total_connections: u64,
    /// Connections currently open
    pub active_connections: u64,
    /// Name registrations completed since start
    pub names_registered: u64,
    /// Sender lines accepted for broadcast
    pub messages_relayed: u64,
    /// Per-recipient deliveries that succeeded
    pub lines_delivered: u64,
    /// Per-recipient deliveries that failed
    pub delivery_failures: u64,
}
