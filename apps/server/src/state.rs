//! Application state

use std::sync::Arc;

use todo_store::Persistence;

use crate::config::ServerConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Active todo store, chosen once at startup
    pub persistence: Persistence,

    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Opens the configured store and builds the application state.
    ///
    /// Fails if the store cannot be initialized; the server must not start
    /// in that case.
    pub async fn new(config: ServerConfig) -> Result<Self, StateError> {
        let persistence = Persistence::open(&config.store_config())
            .await
            .map_err(StateError::Store)?;

        Ok(Self::with_persistence(config, persistence))
    }

    /// Builds state around an already-open store.
    pub fn with_persistence(config: ServerConfig, persistence: Persistence) -> Self {
        Self {
            persistence,
            config: Arc::new(config),
        }
    }
}

/// State initialization errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to initialize todo store: {0}")]
    Store(#[source] todo_store::TodoStoreError),
}
