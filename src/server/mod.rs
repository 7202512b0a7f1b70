//! Server-side components
//!
//! The accept loop ([`ChatServer`]), the per-connection driver
//! ([`Session`]), and the broadcast fan-out ([`Dispatcher`]).

pub mod config;
pub mod dispatcher;
pub mod listener;
pub mod session;

pub use config::ServerConfig;
pub use dispatcher::Dispatcher;
pub use listener::ChatServer;
pub use session::Session;
