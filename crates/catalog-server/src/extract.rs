//! Caller identity extraction from JWT Bearer token, `token` query parameter,
//! or X-User-Id header (dev mode).

use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use catalog_core::{Caller, OwnerId};
use serde::Deserialize;

use crate::auth::validate_token;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Header trusted as the caller id when `allow_dev_identity` is on.
pub const DEV_IDENTITY_HEADER: &str = "X-User-Id";

/// Resolves the [`Caller`] for a request.
///
/// Priority:
/// 1. `Authorization: Bearer <jwt>`, validated with `JWT_SECRET`; `sub` is the user id.
/// 2. `?token=<jwt>`, same validation. Browsers cannot set headers on a
///    WebSocket handshake.
/// 3. `X-User-Id` header, only if `allow_dev_identity` is true in config.
/// 4. Otherwise returns `Unauthorized`.
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub Caller);

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state.config()).map(CallerIdentity)
    }
}

fn resolve(parts: &Parts, config: &ServerConfig) -> Result<Caller, ApiError> {
    // Try JWT Bearer token first
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header.to_str().map_err(|_| {
            ApiError::Unauthorized("Authorization header contains invalid characters".into())
        })?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return caller_from_jwt(token.trim(), config);
        }
    }

    if let Ok(Query(TokenQuery { token: Some(token) })) = Query::try_from_uri(&parts.uri) {
        return caller_from_jwt(token.trim(), config);
    }

    if config.allow_dev_identity {
        return caller_from_dev_header(parts);
    }

    Err(ApiError::Unauthorized(
        "Missing Authorization: Bearer <jwt> header".into(),
    ))
}

fn caller_from_jwt(token: &str, config: &ServerConfig) -> Result<Caller, ApiError> {
    let Some(secret) = config.jwt_secret.as_deref() else {
        return Err(ApiError::Unauthorized(
            "Bearer tokens are not accepted: JWT_SECRET not configured".into(),
        ));
    };

    let claims = validate_token(token, secret)?;
    Ok(Caller::new(OwnerId::new(claims.sub)))
}

fn caller_from_dev_header(parts: &Parts) -> Result<Caller, ApiError> {
    let Some(header_value) = parts.headers.get(DEV_IDENTITY_HEADER) else {
        return Err(ApiError::Unauthorized(format!(
            "Missing Authorization or {} header",
            DEV_IDENTITY_HEADER
        )));
    };

    let user_id = header_value
        .to_str()
        .map_err(|_| {
            ApiError::BadRequest(format!(
                "{} header contains invalid characters",
                DEV_IDENTITY_HEADER
            ))
        })?
        .trim();
    if user_id.is_empty() {
        return Err(ApiError::Unauthorized(format!(
            "{} header is empty",
            DEV_IDENTITY_HEADER
        )));
    }

    tracing::debug!(user_id = %user_id, "Using dev identity from X-User-Id header");
    Ok(Caller::new(OwnerId::new(user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_token;
    use axum::http::Request;

    const SECRET: &str = "test-secret";

    fn test_config(secret: Option<&str>, allow_dev: bool) -> ServerConfig {
        ServerConfig {
            jwt_secret: secret.map(String::from),
            allow_dev_identity: allow_dev,
            ..ServerConfig::default()
        }
    }

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn owner(caller: Result<Caller, ApiError>) -> String {
        caller.unwrap().owner_id().to_string()
    }

    #[test]
    fn test_bearer_token() {
        let token = create_token("alice", SECRET, 1).unwrap();
        let auth = format!("Bearer {}", token);
        let parts = parts("/tv", &[("Authorization", auth.as_str())]);
        assert_eq!(owner(resolve(&parts, &test_config(Some(SECRET), false))), "alice");
    }

    #[test]
    fn test_bearer_token_wrong_secret() {
        let token = create_token("alice", "other", 1).unwrap();
        let auth = format!("Bearer {}", token);
        let parts = parts("/tv", &[("Authorization", auth.as_str())]);
        assert!(matches!(
            resolve(&parts, &test_config(Some(SECRET), false)),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_bearer_token_without_secret_configured() {
        let token = create_token("alice", SECRET, 1).unwrap();
        let auth = format!("Bearer {}", token);
        let parts = parts("/tv", &[("Authorization", auth.as_str())]);
        assert!(resolve(&parts, &test_config(None, true)).is_err());
    }

    #[test]
    fn test_query_token_for_websocket() {
        let token = create_token("bob", SECRET, 1).unwrap();
        let parts = parts(&format!("/ws?token={}", token), &[]);
        assert_eq!(owner(resolve(&parts, &test_config(Some(SECRET), false))), "bob");
    }

    #[test]
    fn test_dev_header_only_when_enabled() {
        let parts = parts("/tv", &[("X-User-Id", "carol")]);
        assert_eq!(owner(resolve(&parts, &test_config(None, true))), "carol");
        assert!(matches!(
            resolve(&parts, &test_config(None, false)),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_no_identity_is_unauthorized() {
        let parts = parts("/tv", &[]);
        assert!(matches!(
            resolve(&parts, &test_config(Some(SECRET), true)),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_bearer_wins_over_dev_header() {
        let token = create_token("alice", SECRET, 1).unwrap();
        let auth = format!("Bearer {}", token);
        let parts = parts("/tv", &[("Authorization", auth.as_str()), ("X-User-Id", "mallory")]);
        assert_eq!(owner(resolve(&parts, &test_config(Some(SECRET), true))), "alice");
    }
}
