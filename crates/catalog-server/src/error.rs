//! API error types with JSON responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_core::{AccessDenied, QueryError, TvId, ValidationError};
use catalog_store::StoreError;
use serde::Serialize;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid record fields (400).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Unusable query parameters (400).
    #[error("{0}")]
    InvalidQuery(#[from] QueryError),

    /// Path id and body id disagree (400).
    #[error("id in body ({body}) does not match id in path ({path})")]
    IdMismatch { path: TvId, body: TvId },

    /// Submitted version is not the stored one (400, flagged as `versionError`).
    #[error(
        "Version conflict: latest stored version is {stored}, your payload version is {submitted}"
    )]
    VersionConflict {
        id: TvId,
        submitted: u64,
        stored: u64,
    },

    /// The record disappeared between the version check and the write (400).
    #[error("tv {0} no longer exists")]
    StaleWrite(TvId),

    /// Not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Unauthorized (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Backend failure (500).
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::IdMismatch { .. } => "ID_MISMATCH",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::StaleWrite(_) => "STALE_WRITE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::Validation(_)
            | Self::InvalidQuery(_)
            | Self::IdMismatch { .. }
            | Self::VersionConflict { .. }
            | Self::StaleWrite(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(e) => Self::Validation(e),
            StoreError::VersionConflict {
                id,
                submitted,
                stored,
            } => Self::VersionConflict {
                id,
                submitted,
                stored,
            },
            StoreError::InvalidFilter(msg) => Self::BadRequest(msg),
            other => Self::Store(other),
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(err: AccessDenied) -> Self {
        match err {
            AccessDenied::NotFound(id) => Self::NotFound(format!("tv {}", id)),
            AccessDenied::Forbidden(_) => {
                Self::Forbidden("tv belongs to another user".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Body of a version conflict response.
///
/// Clients tell it apart from other 400s by `versionError: true`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionErrorResponse {
    pub version_error: bool,
    pub message: String,
    pub submitted_version: u64,
    pub stored_version: u64,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.code(), "Request rejected");
        }

        if let Self::VersionConflict {
            submitted, stored, ..
        } = &self
        {
            let body = VersionErrorResponse {
                version_error: true,
                message: self.to_string(),
                submitted_version: *submitted,
                stored_version: *stored,
            };
            return (status, Json(body)).into_response();
        }

        let message = match &self {
            // backend details stay in the log
            Self::Store(_) => "storage failure".to_string(),
            other => other.to_string(),
        };
        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.code().to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
