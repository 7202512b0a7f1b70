//! Server-side session driver
//!
//! Owns one accepted connection end to end: name registration, the relay
//! loop, and teardown. Teardown always runs on this task, whether the
//! session ends by EOF, by transport failure, or because the dispatcher
//! requested it, so each session unregisters at most once.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{split, AsyncRead, AsyncWrite, ReadHalf};
use tokio::sync::{Mutex, Notify};

use crate::error::{Error, Result};
use crate::protocol::constants::{NAME_PROMPT, WELCOME};
use crate::protocol::line::{is_abrupt_disconnect, LineReader, LineWriter};
use crate::registry::{Message, PeerHandle, Registry, SessionId, SharedWriter};
use crate::server::dispatcher::Dispatcher;
use crate::session::SessionState;
use crate::stats::ServerStats;

/// Driver for one accepted connection
///
/// The write half is shared with the dispatcher behind a mutex; the read
/// half stays private to this task.
pub struct Session<S> {
    state: SessionState,
    reader: LineReader<ReadHalf<S>>,
    writer: SharedWriter,
    shutdown: Arc<Notify>,
    registry: Arc<Registry>,
    dispatcher: Dispatcher,
    stats: Arc<ServerStats>,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Take ownership of an accepted stream
    pub fn new(
        session_id: SessionId,
        stream: S,
        peer_addr: SocketAddr,
        registry: Arc<Registry>,
        dispatcher: Dispatcher,
        stats: Arc<ServerStats>,
    ) -> Self {
        let (read_half, write_half) = split(stream);

        Self {
            state: SessionState::new(session_id, peer_addr),
            reader: LineReader::new(read_half),
            writer: Arc::new(Mutex::new(LineWriter::new(Box::new(write_half)))),
            shutdown: Arc::new(Notify::new()),
            registry,
            dispatcher,
            stats,
        }
    }

    /// Drive the session to completion
    ///
    /// Returns `Ok` on an orderly close; the error is only the cause for the
    /// listener's log, all cleanup has already happened here.
    pub async fn run(mut self) -> Result<()> {
        tracing::debug!(
            session_id = self.state.id,
            peer = %self.state.peer_addr,
            "Session started"
        );

        // Prompt, then block on the name line
        if let Err(e) = self.send_direct(NAME_PROMPT).await {
            self.state.finish_close();
            tracing::debug!(session_id = self.state.id, error = %e, "Failed to send prompt");
            return Err(Error::Io(e));
        }
        self.state.begin_registration();

        let name = match self.reader.next_line().await {
            Ok(Some(line)) => line.trim().to_string(),
            Ok(None) => {
                // Gone before registering: never visible, nothing to announce
                self.state.finish_close();
                tracing::debug!(session_id = self.state.id, "Peer left before registering");
                return Ok(());
            }
            Err(e) => {
                self.state.finish_close();
                if is_abrupt_disconnect(&e) {
                    tracing::debug!(
                        session_id = self.state.id,
                        error = %e,
                        "Connection dropped before registration"
                    );
                } else {
                    tracing::warn!(
                        session_id = self.state.id,
                        error = %e,
                        "Read failed before registration"
                    );
                }
                return Err(Error::Io(e));
            }
        };

        // Enter the registry under the chosen name. Registration and the
        // welcome line happen under one hold of the write lock: the session
        // becomes visible to dispatchers the moment register returns, and
        // the lock keeps any broadcast from landing ahead of the welcome.
        let peer = PeerHandle::new(
            self.state.id,
            &name,
            Arc::clone(&self.writer),
            Arc::clone(&self.shutdown),
        );
        let welcomed = {
            let mut writer = self.writer.lock().await;
            match self.registry.register(peer).await {
                Ok(()) => writer.write_line(WELCOME.as_bytes()).await,
                Err(e) => {
                    drop(writer);
                    // IDs are unique per accept, so this is a lifecycle
                    // bug; fatal to this session only.
                    tracing::error!(
                        session_id = self.state.id,
                        error = %e,
                        "Registry rejected session"
                    );
                    self.close_transport().await;
                    self.state.finish_close();
                    return Err(Error::Registry(e));
                }
            }
        };
        self.state.activate(name.clone());
        self.stats.record_join();

        // A welcome that never made it out still tears down through the
        // normal path below; the session was registered, so it departs.
        let outcome = match welcomed {
            Ok(()) => self.relay(&name).await,
            Err(e) => Err(Error::Io(e)),
        };

        // Single teardown path: leave the registry, announce, close. Only
        // the call that removed the entry announces, so a teardown racing a
        // dispatcher request still departs exactly once.
        self.state.begin_close();
        if self.registry.unregister(self.state.id).await {
            self.dispatcher.dispatch(&Message::departed(&name)).await;
        }
        self.close_transport().await;
        self.state.finish_close();

        tracing::debug!(
            session_id = self.state.id,
            name = %name,
            lines = self.state.lines_relayed,
            duration_ms = self.state.duration().as_millis() as u64,
            "Session closed"
        );

        outcome
    }

    /// Announce the newly registered session, then relay its lines until
    /// the connection ends or the dispatcher requests teardown
    async fn relay(&mut self, name: &str) -> Result<()> {
        self.dispatcher
            .dispatch(&Message::joined(self.state.id, name))
            .await;

        loop {
            tokio::select! {
                line = self.reader.next_line() => match line {
                    Ok(Some(text)) => {
                        let text = text.trim();
                        self.state.record_line(text.len());
                        self.stats.record_relayed();
                        self.dispatcher
                            .dispatch(&Message::chat(self.state.id, name, text))
                            .await;
                    }
                    Ok(None) => {
                        tracing::debug!(session_id = self.state.id, "Peer closed the stream");
                        return Ok(());
                    }
                    Err(e) => {
                        if is_abrupt_disconnect(&e) {
                            tracing::debug!(
                                session_id = self.state.id,
                                error = %e,
                                "Connection dropped"
                            );
                        } else {
                            tracing::warn!(
                                session_id = self.state.id,
                                error = %e,
                                "Read failed"
                            );
                        }
                        return Err(Error::Io(e));
                    }
                },
                _ = self.shutdown.notified() => {
                    tracing::debug!(
                        session_id = self.state.id,
                        "Teardown requested by dispatcher"
                    );
                    return Ok(());
                }
            }
        }
    }

    /// Write a line straight to this session's own transport
    async fn send_direct(&self, text: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_line(text.as_bytes()).await
    }

    /// Best-effort close of the write half
    async fn close_transport(&self) {
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            tracing::trace!(session_id = self.state.id, error = %e, "Write half already gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::DuplexStream;
    use tokio::time::timeout;

    use crate::registry::RegistryError;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    struct Harness {
        registry: Arc<Registry>,
        stats: Arc<ServerStats>,
        dispatcher: Dispatcher,
    }

    impl Harness {
        fn new() -> Self {
            let registry = Arc::new(Registry::new());
            let stats = Arc::new(ServerStats::new());
            let dispatcher = Dispatcher::new(Arc::clone(&registry), Arc::clone(&stats));
            Self {
                registry,
                stats,
                dispatcher,
            }
        }

        fn spawn_session(
            &self,
            session_id: SessionId,
        ) -> (
            tokio::task::JoinHandle<Result<()>>,
            LineReader<ReadHalf<DuplexStream>>,
            LineWriter<tokio::io::WriteHalf<DuplexStream>>,
        ) {
            let (client, server_end) = tokio::io::duplex(1024);
            let addr: SocketAddr = "127.0.0.1:11111".parse().unwrap();
            let session = Session::new(
                session_id,
                server_end,
                addr,
                Arc::clone(&self.registry),
                self.dispatcher.clone(),
                Arc::clone(&self.stats),
            );
            let task = tokio::spawn(session.run());

            let (read_half, write_half) = split(client);
            (task, LineReader::new(read_half), LineWriter::new(write_half))
        }
    }

    #[tokio::test]
    async fn test_registration_and_orderly_close() {
        let harness = Harness::new();
        let (task, mut reader, mut writer) = harness.spawn_session(7);

        assert_eq!(
            reader.next_line().await.unwrap().as_deref(),
            Some(NAME_PROMPT)
        );
        writer.write_line(b"alice").await.unwrap();
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some(WELCOME));

        assert!(harness.registry.contains(7).await);
        assert_eq!(harness.registry.names().await, vec!["alice".to_string()]);

        // Orderly close from the client side
        writer.shutdown().await.unwrap();

        let result = timeout(WAIT, task).await.unwrap().unwrap();
        assert!(result.is_ok());
        assert!(harness.registry.is_empty().await);
        assert_eq!(harness.stats.snapshot().names_registered, 1);
    }

    #[tokio::test]
    async fn test_name_is_trimmed_before_registration() {
        let harness = Harness::new();
        let (task, mut reader, mut writer) = harness.spawn_session(1);

        reader.next_line().await.unwrap();
        writer.write_line(b"  alice \t").await.unwrap();
        reader.next_line().await.unwrap();

        assert_eq!(harness.registry.names().await, vec!["alice".to_string()]);

        writer.shutdown().await.unwrap();
        timeout(WAIT, task).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_leaving_before_name_registers_nothing() {
        let harness = Harness::new();
        let (task, mut reader, mut writer) = harness.spawn_session(1);

        assert_eq!(
            reader.next_line().await.unwrap().as_deref(),
            Some(NAME_PROMPT)
        );
        writer.shutdown().await.unwrap();

        let result = timeout(WAIT, task).await.unwrap().unwrap();
        assert!(result.is_ok());
        assert!(harness.registry.is_empty().await);
        assert_eq!(harness.stats.snapshot().names_registered, 0);
    }

    #[tokio::test]
    async fn test_dispatcher_requested_teardown_unregisters() {
        let harness = Harness::new();
        let (task, mut reader, mut writer) = harness.spawn_session(1);

        reader.next_line().await.unwrap();
        writer.write_line(b"bob").await.unwrap();
        reader.next_line().await.unwrap();

        let peers = harness.registry.snapshot_others(None).await;
        assert_eq!(peers.len(), 1);
        peers[0].request_shutdown();

        let result = timeout(WAIT, task).await.unwrap().unwrap();
        assert!(result.is_ok());
        assert!(harness.registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_session_id_is_fatal_to_newcomer_only() {
        let harness = Harness::new();

        // Occupy ID 7 directly
        let (local, _remote) = tokio::io::duplex(64);
        let writer: SharedWriter = Arc::new(Mutex::new(LineWriter::new(Box::new(local))));
        let squatter = PeerHandle::new(7, "squatter", writer, Arc::new(Notify::new()));
        harness.registry.register(squatter).await.unwrap();

        let (task, mut reader, mut writer) = harness.spawn_session(7);
        reader.next_line().await.unwrap();
        writer.write_line(b"alice").await.unwrap();

        // The session closes instead of greeting
        assert_eq!(reader.next_line().await.unwrap(), None);

        let result = timeout(WAIT, task).await.unwrap().unwrap();
        assert!(matches!(
            result,
            Err(Error::Registry(RegistryError::DuplicateSession(7)))
        ));

        // The existing registration is untouched
        assert_eq!(harness.registry.names().await, vec!["squatter".to_string()]);
    }

    #[tokio::test]
    async fn test_relayed_lines_are_trimmed_and_counted() {
        let harness = Harness::new();
        let (task_a, mut reader_a, mut writer_a) = harness.spawn_session(1);
        reader_a.next_line().await.unwrap();
        writer_a.write_line(b"alice").await.unwrap();
        reader_a.next_line().await.unwrap();

        let (task_b, mut reader_b, mut writer_b) = harness.spawn_session(2);
        reader_b.next_line().await.unwrap();
        writer_b.write_line(b"bob").await.unwrap();
        reader_b.next_line().await.unwrap();

        assert_eq!(
            reader_a.next_line().await.unwrap().as_deref(),
            Some("bob joined the chat")
        );

        writer_b.write_line(b"   hello there  ").await.unwrap();
        assert_eq!(
            reader_a.next_line().await.unwrap().as_deref(),
            Some("bob: hello there")
        );

        writer_b.shutdown().await.unwrap();
        assert_eq!(
            reader_a.next_line().await.unwrap().as_deref(),
            Some("bob left the chat")
        );
        timeout(WAIT, task_b).await.unwrap().unwrap().unwrap();

        assert_eq!(harness.stats.snapshot().messages_relayed, 1);
        assert_eq!(harness.registry.len().await, 1);

        writer_a.shutdown().await.unwrap();
        timeout(WAIT, task_a).await.unwrap().unwrap().unwrap();
    }
}
