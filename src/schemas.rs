use common::Progress;
use compute::ProgressAggregator;
use model::HierarchyRepository;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use crate::auth::{CredentialStore, TokenManager};
use crate::config::AppConfig;
use crate::handlers::{
    auth::{LoginRequest, LoginResponse, SignupRequest},
    notes::{CreateNoteRequest, NoteResponse},
    subjects::{CreateSubjectRequest, SubjectResponse},
    topics::{CreateTopicRequest, TopicResponse, UpdateTopicStatusRequest},
    units::{CreateUnitRequest, UnitResponse, UnitWithTopicsResponse},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Subject/unit/topic/note storage
    pub repository: HierarchyRepository,
    /// Password hashing and user lookup
    pub credentials: CredentialStore,
    /// Access token signing and validation
    pub tokens: TokenManager,
    /// Completion percentages
    pub progress: ProgressAggregator,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            repository: HierarchyRepository::new(db.clone()),
            credentials: CredentialStore::new(db.clone(), config.bcrypt_cost),
            tokens: TokenManager::new(&config.jwt_secret_key, config.token_ttl()),
            progress: ProgressAggregator::new(db.clone()),
            db,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Plain acknowledgement returned by mutations without a body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" when the process is serving requests
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Registers the bearer token scheme referenced by protected routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::signup,
        crate::handlers::auth::login,
        crate::handlers::subjects::get_subjects,
        crate::handlers::subjects::create_subject,
        crate::handlers::subjects::delete_subject,
        crate::handlers::units::get_units,
        crate::handlers::units::create_unit,
        crate::handlers::units::delete_unit,
        crate::handlers::topics::get_topics,
        crate::handlers::topics::create_topic,
        crate::handlers::topics::update_topic_status,
        crate::handlers::topics::delete_topic,
        crate::handlers::notes::get_notes,
        crate::handlers::notes::create_note,
        crate::handlers::notes::delete_note,
        crate::handlers::progress::get_unit_progress,
        crate::handlers::progress::get_subject_progress,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            HealthResponse,
            SignupRequest,
            LoginRequest,
            LoginResponse,
            CreateSubjectRequest,
            SubjectResponse,
            CreateUnitRequest,
            UnitResponse,
            UnitWithTopicsResponse,
            CreateTopicRequest,
            UpdateTopicStatusRequest,
            TopicResponse,
            CreateNoteRequest,
            NoteResponse,
            Progress,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Signup and login"),
        (name = "subjects", description = "Subjects owned by the caller"),
        (name = "units", description = "Units of a subject"),
        (name = "topics", description = "Topics and their completion status"),
        (name = "notes", description = "Notes attached to units"),
        (name = "progress", description = "Completion percentages"),
    ),
    info(
        title = "Exam Prep Tracker API",
        description = "Organize exam preparation into subjects, units and topics and track completion",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
