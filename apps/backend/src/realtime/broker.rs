use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::realtime::protocol::LobbyEventMessage;
use crate::store::{keys, CoordinationStore, StoreError, Subscription};

// Publisher retry configuration (HTTP request path)
const PUBLISHER_MAX_ATTEMPTS: u32 = 3;
const PUBLISHER_INITIAL_RETRY_DELAY_MS: u64 = 50;
const PUBLISHER_MAX_RETRY_DELAY_MS: u64 = 200;

/// Publishes lobby events to per-player channels.
///
/// Delivery is best effort: a failed publish is logged and never undoes
/// the state change it announces.
pub struct RealtimeBroker {
    store: Arc<dyn CoordinationStore>,
}

impl RealtimeBroker {
    pub fn new(store: Arc<dyn CoordinationStore>) -> Self {
        Self { store }
    }

    /// Open the event stream for one player.
    pub async fn subscribe(&self, player_id: &str) -> Result<Subscription, StoreError> {
        self.store.subscribe(&keys::player_channel(player_id)).await
    }

    /// Send `message` to each player, logging any that could not be reached.
    pub async fn notify<'a, I>(&self, players: I, message: &LobbyEventMessage)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let encoded = match serde_json::to_string(message) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error = %err, "failed to serialize lobby event");
                return;
            }
        };

        for player_id in players {
            let channel = keys::player_channel(player_id);
            match self.publish_to_channel(&channel, &encoded).await {
                Ok(()) => debug!(player_id, event = ?message.event, "lobby event published"),
                Err(err) => warn!(
                    player_id,
                    channel = %channel,
                    error = %err,
                    "failed to publish lobby event"
                ),
            }
        }
    }

    async fn publish_to_channel(&self, channel: &str, encoded: &str) -> Result<(), StoreError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;

            match self.store.publish(channel, encoded).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    if attempt >= PUBLISHER_MAX_ATTEMPTS || !err.is_transient() {
                        return Err(err);
                    }

                    let delay_ms = PUBLISHER_INITIAL_RETRY_DELAY_MS
                        .saturating_mul(2_u64.pow(attempt - 1))
                        .min(PUBLISHER_MAX_RETRY_DELAY_MS);
                    warn!(
                        error = %err,
                        attempt,
                        retry_delay_ms = delay_ms,
                        "publish failed, retrying"
                    );
                    sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}
