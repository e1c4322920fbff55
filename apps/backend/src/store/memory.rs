use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::StreamExt;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use super::{CommitOutcome, CoordinationStore, Snapshot, StoreError, Subscription, Versioned, WriteOp, WriteSet, UNWRITTEN};

const CHANNEL_CAPACITY: usize = 64;

/// In-process store for development and tests.
///
/// Deleted keys keep their version so a delete-then-recreate is still seen
/// as a change by older snapshots.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Versioned>>,
    channels: DashMap<String, broadcast::Sender<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live subscribers on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map_or(0, |tx| tx.receiver_count())
    }
}

#[async_trait]
impl CoordinationStore for MemoryStore {
    async fn read(&self, keys: &[String]) -> Result<Snapshot, StoreError> {
        let records = self.records.read();
        let mut snapshot = Snapshot::new();
        for key in keys {
            match records.get(key) {
                Some(rec) => snapshot.insert(key.clone(), rec.value.clone(), rec.version),
                None => snapshot.insert(key.clone(), None, UNWRITTEN),
            }
        }
        Ok(snapshot)
    }

    async fn commit(&self, snapshot: &Snapshot, writes: WriteSet) -> Result<CommitOutcome, StoreError> {
        let mut records = self.records.write();

        let stale = snapshot.watched().any(|(key, version)| {
            records.get(key).map_or(UNWRITTEN, |rec| rec.version) != version
        });
        if stale {
            return Ok(CommitOutcome::Conflict);
        }

        for (key, op) in writes.iter() {
            let rec = records.entry(key.to_string()).or_insert(Versioned {
                value: None,
                version: UNWRITTEN,
            });
            rec.version += 1;
            rec.value = match op {
                WriteOp::Put(value) => Some(value.clone()),
                WriteOp::Delete => None,
            };
        }
        Ok(CommitOutcome::Committed)
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), StoreError> {
        if let Some(tx) = self.channels.get(channel) {
            // No receivers is not an error for fire-and-forget pub/sub.
            let _ = tx.send(payload.to_string());
        }
        self.channels
            .remove_if(channel, |_, tx| tx.receiver_count() == 0);
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError> {
        let rx = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        let channel = channel.to_string();
        let stream = BroadcastStream::new(rx).filter_map(move |item| {
            let channel = channel.clone();
            async move {
                match item {
                    Ok(payload) => Some(payload),
                    Err(err) => {
                        warn!(channel = %channel, error = %err, "subscriber lagged, dropping messages");
                        None
                    }
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
