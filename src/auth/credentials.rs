use model::entities::user;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use super::AuthError;
use super::password::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Email and password are required")]
    MissingFields,

    #[error("Record already exists")]
    DuplicateEmail,

    #[error("Failed to process password: {0}")]
    Hashing(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Stores users and checks their passwords.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    db: DatabaseConnection,
    cost: u32,
}

impl CredentialStore {
    pub fn new(db: DatabaseConnection, cost: u32) -> Self {
        Self { db, cost }
    }

    /// Creates a user and returns its id.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<i32, CredentialError> {
        if email.is_empty() || password.is_empty() {
            return Err(CredentialError::MissingFields);
        }

        let password = password.to_owned();
        let cost = self.cost;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|err| CredentialError::Hashing(err.to_string()))?
            .map_err(|err| {
                error!("Password hashing failed: {}", err);
                CredentialError::Hashing(err.to_string())
            })?;

        let new_user = user::ActiveModel {
            email: Set(email.to_owned()),
            password_hash: Set(password_hash),
            ..Default::default()
        };

        match new_user.insert(&self.db).await {
            Ok(model) => {
                info!("Registered user {}", model.id);
                Ok(model.id)
            }
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    warn!("Signup rejected: email already registered");
                    Err(CredentialError::DuplicateEmail)
                }
                _ => Err(CredentialError::Database(err)),
            },
        }
    }

    /// Returns the user id when the password matches. Unknown emails and
    /// wrong passwords are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn verify(&self, email: &str, password: &str) -> Result<i32, CredentialError> {
        if email.is_empty() || password.is_empty() {
            return Err(CredentialError::MissingFields);
        }

        let Some(found) = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
        else {
            debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        let password = password.to_owned();
        let stored_hash = found.password_hash;
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .unwrap_or(false);

        if matches {
            debug!("Password verified for user {}", found.id);
            Ok(found.id)
        } else {
            debug!("Password mismatch for user {}", found.id);
            Err(AuthError::InvalidCredentials.into())
        }
    }
}
