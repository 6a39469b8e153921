use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod password;

/// Claims carried by every session token: subject identity, email,
/// issuance and expiry timestamps. Tokens are valid until natural
/// expiry; there is no revocation list.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token generation failed: {0}")]
    Generation(String),

    #[error("invalid token")]
    Invalid,
}

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiry_days: i64,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, expiry_days: i64) -> Self {
        Self {
            secret: secret.into(),
            expiry_days,
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.expiry_days)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Rejects bad signatures, malformed tokens, and expired tokens
    /// alike; callers only learn that the token was not acceptable.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::default();
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| TokenError::Invalid)
    }
}
