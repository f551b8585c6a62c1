use axum::{
    extract::State,
    response::Json,
};
use model::entities::subject;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::schemas::{AppState, ErrorResponse, MessageResponse};

/// Request body for creating a subject
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateSubjectRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SubjectResponse {
    pub id: i32,
    pub name: String,
}

impl From<subject::Model> for SubjectResponse {
    fn from(model: subject::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// List the caller's subjects
#[utoipa::path(
    get,
    path = "/subjects",
    tag = "subjects",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subjects owned by the caller", body = Vec<SubjectResponse>),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_subjects(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<SubjectResponse>>> {
    trace!("Entering get_subjects function");

    let subjects = state.repository.list_subjects(user_id).await?;
    debug!("Found {} subjects for user {}", subjects.len(), user_id);

    Ok(Json(subjects.into_iter().map(SubjectResponse::from).collect()))
}

/// Create a subject owned by the caller
#[utoipa::path(
    post,
    path = "/subjects",
    tag = "subjects",
    security(("bearer_auth" = [])),
    request_body = CreateSubjectRequest,
    responses(
        (status = 200, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_subject(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(request): ValidatedJson<CreateSubjectRequest>,
) -> ApiResult<Json<SubjectResponse>> {
    trace!("Entering create_subject function");

    let subject = state
        .repository
        .create_subject(user_id, &request.name)
        .await?;
    info!("Subject {} created for user {}", subject.id, user_id);

    Ok(Json(subject.into()))
}

/// Delete a subject together with its units, topics and notes
#[utoipa::path(
    delete,
    path = "/subjects/{subject_id}",
    tag = "subjects",
    params(("subject_id" = i32, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject deleted (also when it did not exist)", body = MessageResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_subject(
    State(state): State<AppState>,
    ValidatedPath(subject_id): ValidatedPath<i32>,
) -> ApiResult<Json<MessageResponse>> {
    state.repository.delete_subject(subject_id).await?;
    info!("Subject {} deleted", subject_id);
    Ok(Json(MessageResponse::new("Subject deleted")))
}
