//! Credential storage and bearer token handling.

pub mod credentials;
pub mod extractor;
pub mod password;
pub mod token;

use thiserror::Error;

pub use credentials::{CredentialError, CredentialStore};
pub use extractor::AuthUser;
pub use token::{SigningError, TokenManager};

/// Authentication failures. Every variant maps to 401 with its own message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization required: missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid credentials")]
    InvalidCredentials,
}
