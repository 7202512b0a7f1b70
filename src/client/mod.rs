//! Chat client implementation
//!
//! Client-side of the line protocol: a receive loop and a send loop run
//! concurrently over one connection, so a user can keep typing while lines
//! from other participants keep arriving.

pub mod chat;
pub mod config;

pub use chat::{ChatClient, ChatEvent};
pub use config::ClientConfig;
