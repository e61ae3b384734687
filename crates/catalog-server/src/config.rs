//! Server configuration from environment variables.

use std::env;

use http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::events::DEFAULT_CHANNEL_CAPACITY;

/// Server configuration.
///
/// Storage settings (`DATABASE_*`) are read separately by
/// [`catalog_store::StoreConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// HS256 secret for Bearer tokens. Without it only the dev identity works.
    pub jwt_secret: Option<String>,
    /// Trust the `X-User-Id` header as the caller identity.
    pub allow_dev_identity: bool,
    /// Outbound queue depth per WebSocket connection.
    pub notify_channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            log_level: "info".to_string(),
            cors_allowed_origins: "*".to_string(),
            jwt_secret: None,
            allow_dev_identity: false,
            notify_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 8000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `JWT_SECRET`: HS256 secret for Bearer tokens
    /// - `ALLOW_DEV_IDENTITY`: Accept `X-User-Id` (default: false)
    /// - `NOTIFY_CHANNEL_CAPACITY`: Per-connection queue depth (default: 256)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("{:?} is not a port number", raw),
            })?,
            None => defaults.port,
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        let cors_allowed_origins =
            lookup("CORS_ALLOWED_ORIGINS").unwrap_or(defaults.cors_allowed_origins);

        let jwt_secret = lookup("JWT_SECRET").filter(|s| !s.is_empty());

        let allow_dev_identity = lookup("ALLOW_DEV_IDENTITY")
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.allow_dev_identity);

        let notify_channel_capacity = match lookup("NOTIFY_CHANNEL_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "NOTIFY_CHANNEL_CAPACITY".to_string(),
                        reason: format!("{:?} is not a positive integer", raw),
                    });
                }
            },
            None => defaults.notify_channel_capacity,
        };

        let config = Self {
            port,
            log_level,
            cors_allowed_origins,
            jwt_secret,
            allow_dev_identity,
            notify_channel_capacity,
        };
        // origins are validated here, not on first use
        config.allowed_origins()?;
        Ok(config)
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Build the CORS layer for the configured origins.
    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
        Ok(match self.allowed_origins()? {
            Some(origins) => layer.allow_origin(origins),
            None => layer.allow_origin(Any),
        })
    }

    /// Parsed `CORS_ALLOWED_ORIGINS`; `None` when any origin is allowed.
    pub fn allowed_origins(&self) -> Result<Option<Vec<HeaderValue>>, ConfigError> {
        if self.cors_allowed_origins.trim() == "*" {
            return Ok(None);
        }

        self.cors_allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|_| ConfigError::InvalidValue {
                        name: "CORS_ALLOWED_ORIGINS".to_string(),
                        reason: format!("invalid origin {:?}", origin),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
