//! Duplex chat client
//!
//! High-level API for joining a chat server: incoming lines surface as
//! [`ChatEvent`]s on a channel while outgoing lines are queued with
//! [`ChatClient::send`]. The receive and send loops run as separate tasks
//! over the two halves of one connection and never wait on each other; each
//! detects a transport failure on its own and reports it.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::protocol::line::{is_abrupt_disconnect, LineReader, LineWriter};

use super::config::ClientConfig;

/// Events from the chat connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Connected to the server
    Connected,

    /// One line received from the server; prompts, announcements, and
    /// relayed chat all arrive this way
    Line(String),

    /// Server closed the connection in an orderly way
    ServerClosed,

    /// Transport failed; carries the cause
    Error(String),

    /// Disconnected locally
    Disconnected,
}

/// Duplex chat client
///
/// # Example
/// ```no_run
/// use chatcast::client::{ChatClient, ClientConfig};
///
/// # async fn example() -> chatcast::error::Result<()> {
/// let config = ClientConfig::new("127.0.0.1:11111");
/// let (mut client, mut events) = ChatClient::new(config);
///
/// // Spawn event handler
/// tokio::spawn(async move {
///     while let Some(event) = events.recv().await {
///         println!("Event: {:?}", event);
///     }
/// });
///
/// // Connect, answer the name prompt, chat
/// client.connect().await?;
/// client.send("alice").await?;
/// client.send("hello everyone").await?;
/// # Ok(())
/// # }
/// ```
pub struct ChatClient {
    config: ClientConfig,
    event_tx: mpsc::Sender<ChatEvent>,
    outbound: Option<mpsc::Sender<String>>,
    recv_task: Option<JoinHandle<()>>,
    send_task: Option<JoinHandle<()>>,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// Returns the client and a receiver for connection events.
    pub fn new(config: ClientConfig) -> (Self, mpsc::Receiver<ChatEvent>) {
        let (tx, rx) = mpsc::channel(256);

        let client = Self {
            config,
            event_tx: tx,
            outbound: None,
            recv_task: None,
            send_task: None,
        };

        (client, rx)
    }

    /// Connect to the server and start the receive and send loops.
    pub async fn connect(&mut self) -> Result<()> {
        let connect = TcpStream::connect(&self.config.server_addr);
        let stream = match timeout(self.config.connect_timeout, connect).await {
            Ok(connected) => connected?,
            Err(_) => return Err(Error::ConnectTimeout),
        };

        if self.config.tcp_nodelay {
            stream.set_nodelay(true)?;
        }

        tracing::debug!(addr = %self.config.server_addr, "Connected to chat server");
        let _ = self.event_tx.send(ChatEvent::Connected).await;

        let (read_half, write_half) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::channel(256);

        self.recv_task = Some(tokio::spawn(receive_loop(
            LineReader::new(read_half),
            self.event_tx.clone(),
        )));
        self.send_task = Some(tokio::spawn(send_loop(
            LineWriter::new(write_half),
            outbound_rx,
            self.event_tx.clone(),
        )));
        self.outbound = Some(outbound_tx);

        Ok(())
    }

    /// Queue one line for sending.
    ///
    /// Lines that are empty after trimming are dropped by the send loop and
    /// never reach the server.
    pub async fn send(&self, line: impl Into<String>) -> Result<()> {
        let outbound = self.outbound.as_ref().ok_or(Error::NotConnected)?;

        outbound
            .send(line.into())
            .await
            .map_err(|_| Error::NotConnected)
    }

    /// Stop both loops and drop the connection.
    pub async fn disconnect(&mut self) {
        self.outbound.take();
        if let Some(task) = self.send_task.take() {
            task.abort();
        }
        if let Some(task) = self.recv_task.take() {
            task.abort();
        }
        let _ = self.event_tx.send(ChatEvent::Disconnected).await;
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.outbound.is_some()
    }
}

/// Receive loop: surface each incoming line, then the close or the failure
/// that ended the stream.
async fn receive_loop<R>(mut reader: LineReader<R>, events: mpsc::Sender<ChatEvent>)
where
    R: AsyncRead + Unpin,
{
    loop {
        match reader.next_line().await {
            Ok(Some(line)) => {
                if events.send(ChatEvent::Line(line)).await.is_err() {
                    // Event receiver dropped; nobody is listening any more
                    return;
                }
            }
            Ok(None) => {
                tracing::debug!("Connection closed by server");
                let _ = events.send(ChatEvent::ServerClosed).await;
                return;
            }
            Err(e) => {
                if is_abrupt_disconnect(&e) {
                    tracing::debug!(error = %e, "Connection dropped");
                } else {
                    tracing::warn!(error = %e, "Read failed");
                }
                let _ = events.send(ChatEvent::Error(e.to_string())).await;
                return;
            }
        }
    }
}

/// Send loop: drain queued lines, skipping blank ones.
async fn send_loop<W>(
    mut writer: LineWriter<W>,
    mut outbound: mpsc::Receiver<String>,
    events: mpsc::Sender<ChatEvent>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = outbound.recv().await {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        if let Err(e) = writer.write_line(text.as_bytes()).await {
            tracing::debug!(error = %e, "Write failed");
            let _ = events.send(ChatEvent::Error(e.to_string())).await;
            return;
        }
    }

    // Queue closed by disconnect or drop: finish the stream cleanly
    let _ = writer.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_receive_loop_lines_then_server_close() {
        let (local, remote) = tokio::io::duplex(256);
        let (tx, mut rx) = mpsc::channel(16);
        let task = tokio::spawn(receive_loop(LineReader::new(remote), tx));

        let mut writer = LineWriter::new(local);
        writer.write_line(b"Enter your name:").await.unwrap();
        writer.write_line(b"bob: hello").await.unwrap();
        writer.shutdown().await.unwrap();

        assert_eq!(
            rx.recv().await,
            Some(ChatEvent::Line("Enter your name:".to_string()))
        );
        assert_eq!(
            rx.recv().await,
            Some(ChatEvent::Line("bob: hello".to_string()))
        );
        assert_eq!(rx.recv().await, Some(ChatEvent::ServerClosed));
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_loop_skips_blank_lines() {
        let (local, remote) = tokio::io::duplex(256);
        let (out_tx, out_rx) = mpsc::channel(16);
        let (ev_tx, _ev_rx) = mpsc::channel(16);
        let task = tokio::spawn(send_loop(LineWriter::new(local), out_rx, ev_tx));

        out_tx.send("   ".to_string()).await.unwrap();
        out_tx.send(" hi there ".to_string()).await.unwrap();
        out_tx.send("\t".to_string()).await.unwrap();
        drop(out_tx);
        task.await.unwrap();

        // Only the non-blank line went out, trimmed, then a clean EOF
        let mut reader = LineReader::new(remote);
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("hi there"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_loop_reports_write_failure() {
        let (local, remote) = tokio::io::duplex(64);
        let (out_tx, out_rx) = mpsc::channel(16);
        let (ev_tx, mut ev_rx) = mpsc::channel(16);
        drop(remote);

        let task = tokio::spawn(send_loop(LineWriter::new(local), out_rx, ev_tx));
        out_tx.send("hello".to_string()).await.unwrap();

        match ev_rx.recv().await {
            Some(ChatEvent::Error(_)) => {}
            other => panic!("expected error event, got {:?}", other),
        }
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_before_connect_fails() {
        let (client, _events) = ChatClient::new(ClientConfig::new("127.0.0.1:1"));

        let result = client.send("hello").await;
        assert!(matches!(result, Err(Error::NotConnected)));
        assert!(!client.is_connected());
    }
}
