use anyhow::{Context, Result};
use config::{Config, Environment};
use sea_orm::Database;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://examtrack.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";

/// Application configuration.
///
/// Built once at startup and handed to every component that needs it;
/// nothing reads the environment after this point.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    /// Database URL (`DATABASE_URL`)
    pub database_url: String,
    /// Listen address for the HTTP server (`BIND_ADDRESS`)
    pub bind_address: String,
    /// HMAC key for access tokens (`JWT_SECRET_KEY`, required)
    pub jwt_secret_key: String,
    /// Access token lifetime in minutes (`TOKEN_TTL_MINUTES`)
    pub token_ttl_minutes: i64,
    /// bcrypt work factor (`BCRYPT_COST`)
    pub bcrypt_cost: u32,
    /// Allowed CORS origins, comma separated (`CORS_ORIGINS`).
    /// Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("bind_address", &self.bind_address)
            .field("jwt_secret_key", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl AppConfig {
    /// Loads `.env` (if present), then layers environment variables over
    /// the built-in defaults.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("token_ttl_minutes", 15)?
            .set_default("bcrypt_cost", 12)?
            .set_default("cors_origins", Vec::<String>::new())?
            .add_source(
                environment
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration (is JWT_SECRET_KEY set?)")?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes)
    }
}

/// Connect to the configured database and build the shared state
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;
    Ok(AppState::new(db, config))
}
