use crate::config::AppConfig;
use crate::router::create_router;
use crate::schemas::AppState;
use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use axum::Router;
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::json;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub const TEST_SECRET: &str = "test-secret";

/// Configuration used by every test: in-memory database, cheapest bcrypt cost.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        jwt_secret_key: TEST_SECRET.to_string(),
        token_ttl_minutes: 15,
        bcrypt_cost: 4,
        cors_origins: Vec::new(),
    }
}

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;
    AppState::new(db, &test_config())
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level comes from `RUST_LOG` and defaults to WARN.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub async fn setup_test_app() -> Router {
    let _guard = init_test_tracing();

    let state = setup_test_app_state().await;
    create_router(state, &[])
}

pub async fn setup_test_server() -> TestServer {
    TestServer::new(setup_test_app().await).expect("Failed to start test server")
}

/// Sign up and log in, returning the access token.
pub async fn signup_and_login(server: &TestServer, email: &str, password: &str) -> String {
    server
        .post("/auth/signup")
        .json(&json!({ "email": email, "password": password }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["access_token"]
        .as_str()
        .expect("login response carries access_token")
        .to_string()
}

/// `Authorization` header for a token.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header value"),
    )
}
