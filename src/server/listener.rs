//! Chat server listener
//!
//! Handles the TCP accept loop and spawns one session task per connection.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::registry::Registry;
use crate::server::config::ServerConfig;
use crate::server::dispatcher::Dispatcher;
use crate::server::session::Session;
use crate::stats::ServerStats;

/// Chat relay server
pub struct ChatServer {
    config: ServerConfig,
    registry: Arc<Registry>,
    stats: Arc<ServerStats>,
    dispatcher: Dispatcher,
    next_session_id: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl ChatServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(Registry::new());
        let stats = Arc::new(ServerStats::new());
        let dispatcher = Dispatcher::new(Arc::clone(&registry), Arc::clone(&stats));

        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            registry,
            stats,
            dispatcher,
            next_session_id: AtomicU64::new(1),
            connection_semaphore,
        }
    }

    /// Get a reference to the connection registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Get a reference to the server counters
    pub fn stats(&self) -> &Arc<ServerStats> {
        &self.stats
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Chat server listening");

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_until(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` completes
    ///
    /// Callers that bind port 0 can read the real address off the listener
    /// before handing it over. Only the accept loop stops on shutdown;
    /// sessions already spawned keep running until their connections end.
    pub async fn serve_until<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        tracing::info!(addr = %listener.local_addr()?, "Chat server listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit. The permit moves into the session task so
        // the slot frees when the session ends, not when the spawn returns.
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        // Generate session ID
        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        self.stats.record_connection();

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        // Configure socket
        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(session_id = session_id, error = %e, "Failed to configure socket");
            self.stats.record_disconnection();
            return;
        }

        // Spawn session driver
        let registry = Arc::clone(&self.registry);
        let dispatcher = self.dispatcher.clone();
        let stats = Arc::clone(&self.stats);

        tokio::spawn(async move {
            let _permit = permit;

            let session = Session::new(
                session_id,
                socket,
                peer_addr,
                registry,
                dispatcher,
                Arc::clone(&stats),
            );

            if let Err(e) = session.run().await {
                tracing::debug!(
                    session_id = session_id,
                    error = %e,
                    "Session ended with error"
                );
            }

            stats.record_disconnection();
            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }

        Ok(())
    }
}
