//! Connection registry implementation
//!
//! The central map of registered sessions, and the only state in the server
//! mutated by more than one task.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::error::RegistryError;
use super::peer::PeerHandle;
use super::SessionId;

/// Central registry for all registered sessions
///
/// Thread-safe via `RwLock`: membership changes take the write lock,
/// snapshots and queries the read lock. No lock is ever held across
/// network I/O.
#[derive(Default)]
pub struct Registry {
    /// Map of session ID to peer handle
    peers: RwLock<HashMap<SessionId, PeerHandle>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session that has completed name entry
    ///
    /// Names are free-form: duplicates and the empty string are accepted.
    /// Returns an error if the session ID is already present; IDs are unique
    /// per accepted connection, so a duplicate marks a lifecycle bug.
    pub async fn register(&self, peer: PeerHandle) -> Result<(), RegistryError> {
        let mut peers = self.peers.write().await;

        if peers.contains_key(&peer.session_id()) {
            return Err(RegistryError::DuplicateSession(peer.session_id()));
        }

        tracing::info!(
            session_id = peer.session_id(),
            name = peer.name(),
            peers = peers.len() + 1,
            "Session registered"
        );
        peers.insert(peer.session_id(), peer);

        Ok(())
    }

    /// Remove a session if it is present
    ///
    /// Returns whether this call removed the entry. Removal is idempotent;
    /// only the caller that actually removed the entry announces the
    /// departure, so the announcement happens at most once.
    pub async fn unregister(&self, session_id: SessionId) -> bool {
        let mut peers = self.peers.write().await;

        match peers.remove(&session_id) {
            Some(peer) => {
                tracing::info!(
                    session_id = session_id,
                    name = peer.name(),
                    peers = peers.len(),
                    "Session unregistered"
                );
                true
            }
            None => false,
        }
    }

    /// Point-in-time copy of every registered peer except `excluding`
    ///
    /// The copy is taken under the read lock and used after release, so
    /// registrations and removals that happen later leave it untouched.
    pub async fn snapshot_others(&self, excluding: Option<SessionId>) -> Vec<PeerHandle> {
        let peers = self.peers.read().await;

        peers
            .values()
            .filter(|peer| excluding != Some(peer.session_id()))
            .cloned()
            .collect()
    }

    /// Whether a session is currently registered
    pub async fn contains(&self, session_id: SessionId) -> bool {
        self.peers.read().await.contains_key(&session_id)
    }

    /// Number of registered sessions
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// True when no session is registered
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }

    /// Display names of all registered sessions, in no particular order
    pub async fn names(&self) -> Vec<String> {
        self.peers
            .read()
            .await
            .values()
            .map(|peer| peer.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::{Mutex, Notify};
    use tokio_test::assert_ok;

    use crate::protocol::line::LineWriter;

    use super::super::peer::SharedWriter;
    use super::*;

    fn test_peer(session_id: SessionId, name: &str) -> (PeerHandle, tokio::io::DuplexStream) {
        let (local, remote) = tokio::io::duplex(1024);
        let writer: SharedWriter = Arc::new(Mutex::new(LineWriter::new(Box::new(local))));
        let peer = PeerHandle::new(session_id, name, writer, Arc::new(Notify::new()));
        (peer, remote)
    }

    #[tokio::test]
    async fn test_register_distinct_sessions() {
        let registry = Registry::new();
        let (alice, _a) = test_peer(1, "alice");
        let (bob, _b) = test_peer(2, "bob");

        tokio_test::assert_ok!(registry.register(alice).await);
        tokio_test::assert_ok!(registry.register(bob).await);

        assert_eq!(registry.len().await, 2);
        assert!(registry.contains(1).await);
        assert!(registry.contains(2).await);
    }

    #[tokio::test]
    async fn test_duplicate_session_id_rejected() {
        let registry = Registry::new();
        let (first, _a) = test_peer(1, "alice");
        let (second, _b) = test_peer(1, "impostor");

        registry.register(first).await.unwrap();
        let result = registry.register(second).await;

        assert!(matches!(result, Err(RegistryError::DuplicateSession(1))));

        // The original registration is untouched
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.names().await, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed() {
        let registry = Registry::new();
        let (first, _a) = test_peer(1, "alice");
        let (second, _b) = test_peer(2, "alice");
        let (third, _c) = test_peer(3, "");

        registry.register(first).await.unwrap();
        registry.register(second).await.unwrap();
        registry.register(third).await.unwrap();

        assert_eq!(registry.len().await, 3);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = Registry::new();
        let (alice, _a) = test_peer(1, "alice");
        let (bob, _b) = test_peer(2, "bob");

        registry.register(alice).await.unwrap();
        registry.register(bob).await.unwrap();

        assert!(registry.unregister(1).await);
        assert!(!registry.unregister(1).await);
        assert!(!registry.unregister(99).await);

        // Other sessions are unaffected
        assert!(registry.contains(2).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_excludes_only_the_sender() {
        let registry = Registry::new();
        let (alice, _a) = test_peer(1, "alice");
        let (bob, _b) = test_peer(2, "bob");
        let (carol, _c) = test_peer(3, "carol");

        registry.register(alice).await.unwrap();
        registry.register(bob).await.unwrap();
        registry.register(carol).await.unwrap();

        let others = registry.snapshot_others(Some(2)).await;
        let mut ids: Vec<SessionId> = others.iter().map(|p| p.session_id()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);

        // Without an origin, everyone is included
        assert_eq!(registry.snapshot_others(None).await.len(), 3);
    }

    #[tokio::test]
    async fn test_snapshot_survives_membership_changes() {
        let registry = Registry::new();
        let (alice, _a) = test_peer(1, "alice");
        let (bob, _b) = test_peer(2, "bob");
        let (carol, _c) = test_peer(3, "carol");

        registry.register(alice).await.unwrap();
        registry.register(bob).await.unwrap();
        registry.register(carol).await.unwrap();

        let snapshot = registry.snapshot_others(Some(1)).await;
        registry.unregister(2).await;

        // The copy still holds bob even though he left afterwards
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().any(|p| p.session_id() == 2));
        assert_eq!(registry.len().await, 2);
    }
}
