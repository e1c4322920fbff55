use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::realtime::{ConnectionRegistry, RealtimeBroker};
use crate::services::LobbyService;
use crate::store::CoordinationStore;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Coordination store holding lobbies and players
    pub store: Arc<dyn CoordinationStore>,
    /// Per-player event publisher
    pub broker: Arc<RealtimeBroker>,
    /// Live WebSocket sessions in this process
    pub registry: Arc<ConnectionRegistry>,
    /// Cancelled when the server begins shutting down
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(store: Arc<dyn CoordinationStore>) -> Self {
        let broker = Arc::new(RealtimeBroker::new(store.clone()));
        Self {
            store,
            broker,
            registry: Arc::new(ConnectionRegistry::new()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn lobbies(&self) -> LobbyService {
        LobbyService::new(self.store.clone(), self.broker.clone(), self.shutdown.clone())
    }
}
