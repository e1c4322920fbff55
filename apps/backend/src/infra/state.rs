use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::redis_store::RedisStore;
use crate::store::CoordinationStore;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    store_config: StoreConfig,
    store: Option<Arc<dyn CoordinationStore>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            store_config: StoreConfig::Memory,
            store: None,
        }
    }

    pub fn with_store(mut self, store_config: StoreConfig) -> Self {
        self.store_config = store_config;
        self
    }

    /// Use an already constructed store; takes precedence over `with_store`.
    pub fn with_store_instance(mut self, store: Arc<dyn CoordinationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        if let Some(store) = self.store {
            return Ok(AppState::new(store));
        }

        let store: Arc<dyn CoordinationStore> = match self.store_config {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::Redis(url) => {
                let store = RedisStore::connect(&url).await?;
                store.ping().await?;
                Arc::new(store)
            }
        };
        Ok(AppState::new(store))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
