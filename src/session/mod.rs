//! Session lifecycle state
//!
//! The phase machine for one connection, from accept to close. The server's
//! I/O driver in [`crate::server::session`] owns one of these per connection.

pub mod state;

pub use state::{SessionPhase, SessionState};
