//! Line-oriented TCP chat relay
//!
//! A broadcast chat server and its duplex client over a plain newline
//! protocol: every connection registers a display name, and every line it
//! sends afterwards is relayed to all other registered connections.
//!
//! # Architecture
//!
//! ```text
//!   accept ──► Session ──► prompt / name ──► registry.register()
//!                │                                  │
//!                │ next_line()                      │ snapshot_others(sender)
//!                ▼                                  ▼
//!           Dispatcher ──► peer.send("name: text") per recipient
//!                                  │
//!   session teardown ◄── Notify ◄──┘ (on delivery failure)
//! ```
//!
//! The registry is the only shared mutable state. Broadcasts copy the
//! membership under a short read lock and do all network writes after the
//! lock is released, so one slow or dead recipient never stalls the others.
//!
//! # Server
//!
//! ```no_run
//! use chatcast::{ChatServer, ServerConfig};
//!
//! # async fn example() -> chatcast::Result<()> {
//! let config = ServerConfig::default().max_connections(100);
//! let server = ChatServer::new(config);
//! server.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Client
//!
//! ```no_run
//! use chatcast::{ChatClient, ChatEvent, ClientConfig};
//!
//! # async fn example() -> chatcast::Result<()> {
//! let (mut client, mut events) = ChatClient::new(ClientConfig::new("127.0.0.1:11111"));
//! client.connect().await?;
//!
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         if let ChatEvent::Line(line) = event {
//!             println!("{}", line);
//!         }
//!     }
//! });
//!
//! // The first line answers the name prompt; later lines are chat
//! client.send("alice").await?;
//! client.send("hello everyone").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use client::{ChatClient, ChatEvent, ClientConfig};
pub use error::{Error, Result};
pub use registry::{Message, Registry};
pub use server::{ChatServer, ServerConfig};
