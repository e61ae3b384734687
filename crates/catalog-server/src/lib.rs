//! catalog-server: HTTP and WebSocket API for the TV catalog
//!
//! This crate provides:
//! - REST endpoints over the caller's TV records (`/tv`, `/tv/{id}`)
//! - A WebSocket endpoint (`/ws`) pushing create/update/delete events to the
//!   owner's open sessions
//! - Caller identity resolution (JWT Bearer, `token` query parameter, dev header)
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request ID generation and propagation
//! - Request tracing and logging
//! - CORS handling (added by the binary from configuration)
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_server::{AppState, ServerConfig, build_app};
//! use catalog_store::TvStore;
//!
//! let state = AppState::new(TvStore::in_memory(), ServerConfig::default());
//! let app = build_app(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{make_request_span, propagate_request_id, request_id_layer};

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use events::{NotificationHub, TvAction, TvEvent};
pub use service::TvService;
pub use state::AppState;

// Re-export dependent crates
pub use catalog_core;
pub use catalog_store;

/// Router with all routes and the request-id and tracing layers.
pub fn build_app(state: AppState) -> Router {
    routes::build_router(state)
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(request_id_layer())
}
