use std::collections::HashMap;

use actix::prelude::*;
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

/// Asks a live session to close its socket and stop.
#[derive(Message, Clone, Copy, Debug)]
#[rtype(result = "()")]
pub struct Shutdown;

struct Connection {
    conn_id: Uuid,
    recipient: Recipient<Shutdown>,
}

/// Process-local map of player identity to its live connection.
///
/// A player has at most one connection; registering a new one tells the
/// previous one to shut down.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, player_id: &str, conn_id: Uuid, recipient: Recipient<Shutdown>) {
        let previous = self.connections.write().insert(
            player_id.to_string(),
            Connection { conn_id, recipient },
        );

        if let Some(old) = previous {
            if old.conn_id != conn_id {
                info!(
                    player_id,
                    old_conn_id = %old.conn_id,
                    conn_id = %conn_id,
                    "superseding existing connection"
                );
                old.recipient.do_send(Shutdown);
            }
        }
    }

    /// Remove the entry only if it still belongs to `conn_id`.
    pub fn unregister(&self, player_id: &str, conn_id: Uuid) -> bool {
        let mut connections = self.connections.write();
        match connections.get(player_id) {
            Some(conn) if conn.conn_id == conn_id => {
                connections.remove(player_id);
                true
            }
            _ => false,
        }
    }

    pub fn connection_for(&self, player_id: &str) -> Option<Uuid> {
        self.connections.read().get(player_id).map(|c| c.conn_id)
    }

    pub fn len(&self) -> usize {
        self.connections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.read().is_empty()
    }

    /// Tell every live session to stop; used on server shutdown.
    pub fn shutdown_all(&self) {
        let connections = std::mem::take(&mut *self.connections.write());
        for (_, conn) in connections {
            conn.recipient.do_send(Shutdown);
        }
    }
}
