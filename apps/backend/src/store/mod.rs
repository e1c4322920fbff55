//! Coordination store: versioned records, optimistic commits and pub/sub.
//!
//! Every record carries a version that increases on each write, including
//! deletes, so a commit can be checked against the snapshot it was planned
//! from. The store never assumes this process is its only writer.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub mod memory;
pub mod redis_store;
pub mod txn;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Version of a key that has never been written.
pub const UNWRITTEN: u64 = 0;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("malformed record at {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode record for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected reply from store: {0}")]
    Protocol(String),
}

impl StoreError {
    /// Connection-level failures that may succeed when retried.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Redis(err) => {
                err.is_io_error()
                    || err.is_timeout()
                    || err.is_connection_dropped()
                    || err.is_connection_refusal()
            }
            StoreError::Malformed { .. } | StoreError::Encode { .. } | StoreError::Protocol(_) => {
                false
            }
        }
    }
}

/// A value as read from the store, with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: Option<String>,
    pub version: u64,
}

/// Consistent view of a set of watched keys.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: HashMap<String, Versioned>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>, version: u64) {
        self.entries
            .insert(key.into(), Versioned { value, version });
    }

    /// Keys this snapshot watches.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn watched(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.version))
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.value.as_deref())
    }

    pub fn version(&self, key: &str) -> u64 {
        self.entries.get(key).map_or(UNWRITTEN, |v| v.version)
    }

    /// Decode the JSON record at `key`; `None` when the key holds nothing.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        self.raw(key)
            .map(|raw| {
                serde_json::from_str(raw).map_err(|source| StoreError::Malformed {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put(String),
    Delete,
}

/// Writes applied together by one commit, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct WriteSet {
    ops: Vec<(String, WriteOp)>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_json<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<(), StoreError> {
        let key = key.into();
        let encoded = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.clone(),
            source,
        })?;
        self.ops.push((key, WriteOp::Put(encoded)));
        Ok(())
    }

    pub fn delete(&mut self, key: impl Into<String>) {
        self.ops.push((key.into(), WriteOp::Delete));
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WriteOp)> {
        self.ops.iter().map(|(k, op)| (k.as_str(), op))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// A watched key changed after the snapshot was read; nothing was written.
    Conflict,
}

/// Payloads published on one channel, in publish order.
pub type Subscription = BoxStream<'static, String>;

#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Atomic multi-key read.
    async fn read(&self, keys: &[String]) -> Result<Snapshot, StoreError>;

    /// Apply `writes` only if every key in `snapshot` still has the version it was read at.
    async fn commit(&self, snapshot: &Snapshot, writes: WriteSet) -> Result<CommitOutcome, StoreError>;

    async fn publish(&self, channel: &str, payload: &str) -> Result<(), StoreError>;

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Key and channel naming.
pub mod keys {
    pub fn lobby(lobby_id: &str) -> String {
        format!("lobby:{lobby_id}")
    }

    pub fn player(player_id: &str) -> String {
        format!("player:{player_id}")
    }

    pub fn player_channel(player_id: &str) -> String {
        format!("events:player:{player_id}")
    }
}
