//! Per-session peer handles
//!
//! A [`PeerHandle`] is the registry's view of one registered session: its
//! identity, display name, the shared write half of its transport, and the
//! teardown signal used when a delivery to it fails.

use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use crate::protocol::line::{BoxedWriteHalf, LineWriter};

use super::message::Message;
use super::SessionId;

/// Write half shared between a session and the dispatcher. The mutex is the
/// per-session write lock that keeps concurrently delivered lines whole.
pub type SharedWriter = Arc<Mutex<LineWriter<BoxedWriteHalf>>>;

/// Cloneable handle to one registered session
#[derive(Clone)]
pub struct PeerHandle {
    session_id: SessionId,
    name: Arc<str>,
    writer: SharedWriter,
    shutdown: Arc<Notify>,
}

impl PeerHandle {
    /// Create a handle for a session entering the registry
    pub fn new(
        session_id: SessionId,
        name: &str,
        writer: SharedWriter,
        shutdown: Arc<Notify>,
    ) -> Self {
        Self {
            session_id,
            name: Arc::from(name),
            writer,
            shutdown,
        }
    }

    /// Identity of the owning session
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Display name the session registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deliver one message line to this peer's transport
    ///
    /// Holds the per-session write lock for the duration of the write, so a
    /// line from another sender can never split this one.
    pub async fn send(&self, message: &Message) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_line(message.as_bytes()).await
    }

    /// Ask the owning session to tear itself down
    ///
    /// The session leaves its read loop and runs its normal teardown, which
    /// keeps unregistration on a single path. The notification permit is
    /// stored, so a request sent while the session is mid-read is not lost.
    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }
}

impl std::fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerHandle")
            .field("session_id", &self.session_id)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::line::LineReader;

    fn peer_over_duplex(session_id: SessionId, name: &str) -> (PeerHandle, tokio::io::DuplexStream) {
        let (local, remote) = tokio::io::duplex(1024);
        let writer: SharedWriter = Arc::new(Mutex::new(LineWriter::new(Box::new(local))));
        let peer = PeerHandle::new(session_id, name, writer, Arc::new(Notify::new()));
        (peer, remote)
    }

    #[tokio::test]
    async fn test_send_writes_one_line() {
        let (peer, remote) = peer_over_duplex(1, "alice");
        let mut reader = LineReader::new(remote);

        peer.send(&Message::chat(2, "bob", "hi")).await.unwrap();
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("bob: hi"));
    }

    #[tokio::test]
    async fn test_send_to_closed_transport_fails() {
        let (peer, remote) = peer_over_duplex(1, "alice");
        drop(remote);

        let result = peer.send(&Message::system("ping")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_request_is_not_lost() {
        let (peer, _remote) = peer_over_duplex(1, "alice");
        let shutdown = Arc::clone(&peer.shutdown);

        // Signal before anyone is waiting; the later wait must still wake.
        peer.request_shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(1), shutdown.notified())
            .await
            .unwrap();
    }
}
