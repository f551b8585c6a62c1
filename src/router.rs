use crate::handlers::{
    auth::{login, signup},
    health::health_check,
    notes::{create_note, delete_note, get_notes},
    progress::{get_subject_progress, get_unit_progress},
    subjects::{create_subject, delete_subject, get_subjects},
    topics::{create_topic, delete_topic, get_topics, update_topic_status},
    units::{create_unit, delete_unit, get_units},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the CORS layer. An empty origin list allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        debug!("No CORS origins configured, allowing any origin");
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// Create application router with all routes and middleware
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Credentials
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        // Subjects
        .route("/subjects", get(get_subjects).post(create_subject))
        .route("/subjects/:subject_id", delete(delete_subject))
        .route("/subjects/:subject_id/units", get(get_units).post(create_unit))
        .route("/subjects/:subject_id/progress", get(get_subject_progress))
        // Units
        .route("/units/:unit_id", delete(delete_unit))
        .route("/units/:unit_id/topics", get(get_topics).post(create_topic))
        .route("/units/:unit_id/notes", get(get_notes).post(create_note))
        .route("/units/:unit_id/progress", get(get_unit_progress))
        // Topics
        .route("/topics/:topic_id", delete(delete_topic))
        .route("/topics/:topic_id/status", put(update_topic_status))
        // Notes
        .route("/notes/:note_id", delete(delete_note))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // The Prometheus recorder is process global and can only be installed
    // once, so test builds (many routers per process) go without it.
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route(
                "/metrics",
                get(move || std::future::ready(metric_handle.render())),
            )
            .layer(prometheus_layer)
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(cors_layer(cors_origins)),
        )
        .with_state(state)
}
