//! Connection registry for broadcast routing
//!
//! The registry is the single source of truth mapping live sessions to their
//! display names and write halves. A session registers once its name line
//! arrives, unregisters exactly once on teardown, and the dispatcher works
//! from point-in-time snapshots to fan a line out to every other peer.
//!
//! # Architecture
//!
//! ```text
//!                           Arc<Registry>
//!                 ┌───────────────────────────────┐
//!                 │ peers: RwLock<HashMap<        │
//!                 │   SessionId,                  │
//!                 │   PeerHandle {                │
//!                 │     name,                     │
//!                 │     writer: Arc<Mutex<..>>,   │
//!                 │     shutdown: Arc<Notify>,    │
//!                 │   }                           │
//!                 │ >>                            │
//!                 └───────────────┬───────────────┘
//!                                 │ snapshot_others(sender)
//!         ┌───────────────────────┼───────────────────────┐
//!         ▼                       ▼                       ▼
//!    [Session A]            [Session B]             [Session C]
//!    next_line()            peer.send(msg)          peer.send(msg)
//!         │                       ▲                       ▲
//!         └──► dispatcher ────────┴───────────────────────┘
//! ```
//!
//! # Snapshot Design
//!
//! Membership changes and snapshot reads serialize on one `RwLock`; network
//! writes always happen after the lock is released, against the snapshot, so
//! a slow recipient never blocks registration or teardown of other sessions.
//! The rendered line is a `bytes::Bytes`, so the fan-out shares one
//! allocation and each delivery clones only the reference.

pub mod error;
pub mod message;
pub mod peer;
pub mod store;

pub use error::RegistryError;
pub use message::Message;
pub use peer::{PeerHandle, SharedWriter};
pub use store::Registry;

/// Unique identity of one accepted connection for the life of the process
pub type SessionId = u64;
