//! HS256 Bearer tokens.
//!
//! Tokens are issued elsewhere; the server only validates them. `create_token`
//! exists for tooling and tests that need a token signed with the shared secret.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// JWT claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id (subject). Becomes the record owner.
    pub sub: String,
    /// Expiration time (unix timestamp).
    pub exp: usize,
    /// Issued at (unix timestamp).
    #[serde(default)]
    pub iat: usize,
}

/// Create a JWT token for a user.
pub fn create_token(user_id: &str, secret: &str, expiry_hours: u64) -> Result<String, ApiError> {
    let now = chrono::Utc::now();
    let exp = (now + chrono::Duration::hours(expiry_hours as i64)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))
}

/// Validate a JWT token and return claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized(format!("Invalid token: {}", e))
    })?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(ApiError::Unauthorized("token has an empty subject".to_string()));
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate_token() {
        let secret = "test_secret_key_12345";
        let token = create_token("user-1", secret, 24).unwrap();
        let claims = validate_token(&token, secret).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_validate_token_wrong_secret() {
        let token = create_token("user-1", "secret1", 24).unwrap();
        assert!(validate_token(&token, "secret2").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = "secret";
        let past = chrono::Utc::now().timestamp() as usize - 7200;
        let claims = Claims {
            sub: "user-1".into(),
            exp: past,
            iat: past - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            validate_token(&token, secret),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let token = create_token("  ", "secret", 1).unwrap();
        assert!(validate_token(&token, "secret").is_err());
    }
}
