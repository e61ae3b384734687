//! Per-user change notifications.
//!
//! The [`NotificationHub`] keeps, for every user, the set of WebSocket connections
//! currently open for that user. Each connection owns a bounded queue; the hub
//! serializes an event once and pushes the text into every queue of the owner.
//!
//! # Delivery
//!
//! - Best-effort: no acknowledgment, no retry, nothing kept for offline users
//! - `send` never waits on a client. A full queue drops the event for that
//!   connection only
//! - A closed queue means the session is gone; its entry is removed on the spot
//!
//! # Wire format
//!
//! ```json
//! {"action":"update","payload":{"tv":{ ... }}}
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use catalog_core::{OwnerId, Tv};
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Default outbound queue depth per connection.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Identifier of one registered connection.
pub type ConnectionId = Uuid;

// ============================================================================
// Event Types
// ============================================================================

/// What happened to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TvAction {
    Create,
    Update,
    Delete,
}

/// Event pushed to the owner's open sessions.
#[derive(Debug, Clone, Serialize)]
pub struct TvEvent {
    pub action: TvAction,
    pub payload: TvPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct TvPayload {
    pub tv: Tv,
}

impl TvEvent {
    pub fn new(action: TvAction, tv: Tv) -> Self {
        Self {
            action,
            payload: TvPayload { tv },
        }
    }

    pub fn created(tv: Tv) -> Self {
        Self::new(TvAction::Create, tv)
    }

    pub fn updated(tv: Tv) -> Self {
        Self::new(TvAction::Update, tv)
    }

    /// `tv` is the record as it was just before removal.
    pub fn deleted(tv: Tv) -> Self {
        Self::new(TvAction::Delete, tv)
    }
}

// ============================================================================
// Notification Hub
// ============================================================================

/// A registered connection's receiving end.
#[derive(Debug)]
pub struct Subscription {
    pub id: ConnectionId,
    pub owner_id: OwnerId,
    pub receiver: mpsc::Receiver<String>,
}

type Registry = HashMap<OwnerId, HashMap<ConnectionId, mpsc::Sender<String>>>;

/// Registry of open connections per user.
///
/// Cloning shares the registry. One hub is created at server start and handed to
/// handlers through the application state.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    connections: Arc<RwLock<Registry>>,
    /// Queue depth for connections opened through [`subscribe`](Self::subscribe).
    capacity: usize,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    /// Create a hub with the default per-connection capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a hub with a custom per-connection capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Register `sender` as an open connection of `owner_id`.
    pub async fn register(&self, owner_id: OwnerId, sender: mpsc::Sender<String>) -> ConnectionId {
        let id = Uuid::new_v4();
        let mut connections = self.connections.write().await;
        let entry = connections.entry(owner_id.clone()).or_default();
        entry.insert(id, sender);

        tracing::debug!(
            owner_id = %owner_id,
            connection_id = %id,
            open = entry.len(),
            "Registered connection"
        );
        id
    }

    /// Open a new queue for `owner_id` and register it.
    pub async fn subscribe(&self, owner_id: OwnerId) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = self.register(owner_id.clone(), sender).await;
        Subscription {
            id,
            owner_id,
            receiver,
        }
    }

    /// Remove a connection from whichever user holds it.
    ///
    /// Returns false if it was not registered.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        let mut removed = false;
        connections.retain(|owner_id, conns| {
            if conns.remove(&id).is_some() {
                removed = true;
                tracing::debug!(owner_id = %owner_id, connection_id = %id, "Unregistered connection");
            }
            !conns.is_empty()
        });
        removed
    }

    /// Push `event` to every open connection of `owner_id`.
    ///
    /// Returns the number of connections the event was queued on. Unknown users
    /// and users with no open connections are a no-op.
    pub async fn send(&self, owner_id: &OwnerId, event: &TvEvent) -> usize {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize event");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut closed = Vec::new();
        {
            let connections = self.connections.read().await;
            let Some(conns) = connections.get(owner_id) else {
                tracing::trace!(owner_id = %owner_id, "No open connections for event");
                return 0;
            };

            for (id, sender) in conns {
                match sender.try_send(text.clone()) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(
                            owner_id = %owner_id,
                            connection_id = %id,
                            "Connection queue full, dropping event"
                        );
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut connections = self.connections.write().await;
            if let Some(conns) = connections.get_mut(owner_id) {
                for id in &closed {
                    conns.remove(id);
                }
                if conns.is_empty() {
                    connections.remove(owner_id);
                }
            }
            tracing::debug!(owner_id = %owner_id, dropped = closed.len(), "Dropped closed connections");
        }

        tracing::debug!(
            owner_id = %owner_id,
            action = ?event.action,
            delivered,
            "Sent event"
        );
        delivered
    }

    /// Number of open connections for `owner_id`.
    pub async fn connection_count(&self, owner_id: &OwnerId) -> usize {
        let connections = self.connections.read().await;
        connections.get(owner_id).map(HashMap::len).unwrap_or(0)
    }

    /// Number of users with at least one open connection.
    pub async fn user_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
