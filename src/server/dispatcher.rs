//! Broadcast dispatcher
//!
//! Delivers one message to every registered session except its origin. The
//! membership snapshot is taken first and the registry lock released before
//! any network write, so delivery never blocks registration or teardown.

use std::sync::Arc;

use crate::registry::{Message, Registry};
use crate::stats::ServerStats;

/// Fans one message out to all other registered sessions
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    stats: Arc<ServerStats>,
}

impl Dispatcher {
    /// Create a dispatcher over the given registry
    pub fn new(registry: Arc<Registry>, stats: Arc<ServerStats>) -> Self {
        Self { registry, stats }
    }

    /// Deliver `message` to every registered session except its origin
    ///
    /// A failed delivery never aborts the rest of the fan-out: the failing
    /// peer is asked to tear itself down through its own session and the
    /// loop moves on. The registry is not touched here, so a session is
    /// only ever removed by its own teardown. The sender learns nothing
    /// about recipients or failures.
    pub async fn dispatch(&self, message: &Message) {
        let recipients = self.registry.snapshot_others(message.origin()).await;

        for peer in &recipients {
            match peer.send(message).await {
                Ok(()) => {
                    self.stats.record_delivery();
                }
                Err(e) => {
                    self.stats.record_delivery_failure();
                    tracing::debug!(
                        session_id = peer.session_id(),
                        name = peer.name(),
                        error = %e,
                        "Delivery failed, requesting session teardown"
                    );
                    peer.request_shutdown();
                }
            }
        }

        tracing::trace!(
            recipients = recipients.len(),
            line = %message,
            "Broadcast dispatched"
        );
    }
}
