use anyhow::Result;
use tracing::{debug, error, info, trace};

use super::initdb::run_migrations;
use super::serve::run_server;
use crate::config::{AppConfig, initialize_app_state};

pub async fn migrate_and_serve(config: &AppConfig) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");
    debug!("Configuration: {:?}", config);

    let state = match initialize_app_state(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    // Same pool for migrations and serving
    run_migrations(&state.db).await?;

    run_server(state, config).await
}
