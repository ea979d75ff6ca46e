//! Access-token signing and validation.
//!
//! Login and account management live in the account service. This module
//! only understands the HS256 access tokens that service mints with the
//! shared secret; `issue_token` exists for the seed binary and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::user::UserRole;

/// JWT claims embedded in access tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: UserRole,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Sign an access token for a user id and role.
pub fn issue_token(
    user_id: i32,
    role: UserRole,
    jwt_secret: &str,
    expiry_secs: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        token_type: "access".to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::default();

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let secret = "test-secret-key-for-jwt";
        let token = issue_token(42, UserRole::Billing, secret, 900).unwrap();

        let claims = validate_token(&token, secret).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, UserRole::Billing);
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn invalid_token_rejected() {
        let result = validate_token("garbage.token.here", "secret");
        assert!(result.is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_token(1, UserRole::Customer, "secret-a", 900).unwrap();
        assert!(validate_token(&token, "secret-b").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let secret = "test-secret";
        // Expired well beyond the 60s leeway window
        let token = issue_token(1, UserRole::Admin, secret, -3600).unwrap();
        assert!(validate_token(&token, secret).is_err());
    }
}
