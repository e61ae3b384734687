//! Application state shared across handlers.

use std::sync::Arc;

use catalog_store::TvStore;

use crate::config::ServerConfig;
use crate::events::NotificationHub;
use crate::service::TvService;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Record operations.
    service: Arc<TvService>,
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Open WebSocket sessions per user.
    hub: NotificationHub,
}

impl AppState {
    /// Create new application state.
    ///
    /// The notification hub lives as long as this state; it is not a global.
    pub fn new(store: TvStore, config: ServerConfig) -> Self {
        let hub = NotificationHub::with_capacity(config.notify_channel_capacity);
        Self {
            service: Arc::new(TvService::new(store, hub.clone())),
            config: Arc::new(config),
            hub,
        }
    }

    /// Get a reference to the record service.
    pub fn service(&self) -> &TvService {
        &self.service
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a reference to the notification hub.
    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
