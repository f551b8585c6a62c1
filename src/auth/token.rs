use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use super::AuthError;

/// Access token payload. The subject is the user id rendered as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: u64,
}

/// A token could not be signed. This is a server fault, not a client one.
#[derive(Debug, Error)]
#[error("Failed to sign access token: {0}")]
pub struct SigningError(#[from] pub(crate) jsonwebtoken::errors::Error);

/// Issues and validates HS256 access tokens.
#[derive(Clone)]
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue_token(&self, user_id: i32) -> Result<String, SigningError> {
        let exp = (Utc::now() + self.ttl).timestamp().max(0) as u64;
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |err| {
                error!("Failed to sign token for user {}: {}", user_id, err);
                SigningError(err)
            },
        )
    }

    /// Validates signature and expiry and returns the user id in `sub`.
    pub fn authenticate(&self, token: &str) -> Result<i32, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(err.to_string()),
            })?;

        let user_id = data
            .claims
            .sub
            .parse::<i32>()
            .map_err(|_| AuthError::InvalidToken("Subject is not a user id".to_string()))?;
        debug!("Authenticated user {}", user_id);
        Ok(user_id)
    }
}
