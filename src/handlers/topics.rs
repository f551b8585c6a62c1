use axum::{
    extract::State,
    response::Json,
};
use model::entities::topic;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::schemas::{AppState, MessageResponse};

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTopicRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// New status for a topic. Checked against the known values by the
/// repository, so an unknown or missing status is a 400.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateTopicStatusRequest {
    /// One of "Not Started", "In Progress", "Completed"
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TopicResponse {
    pub id: i32,
    pub name: String,
    /// One of "Not Started", "In Progress", "Completed"
    pub status: String,
}

impl From<topic::Model> for TopicResponse {
    fn from(model: topic::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            status: model.status.to_string(),
        }
    }
}

/// List the topics of a unit
#[utoipa::path(
    get,
    path = "/units/{unit_id}/topics",
    tag = "topics",
    params(("unit_id" = i32, Path, description = "Unit ID")),
    responses(
        (status = 200, description = "Topics ordered by id", body = Vec<TopicResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_topics(
    State(state): State<AppState>,
    ValidatedPath(unit_id): ValidatedPath<i32>,
) -> ApiResult<Json<Vec<TopicResponse>>> {
    let topics = state.repository.list_topics_for_unit(unit_id).await?;
    debug!("Found {} topics in unit {}", topics.len(), unit_id);
    Ok(Json(topics.into_iter().map(TopicResponse::from).collect()))
}

/// Add a topic to a unit. New topics start as "Not Started".
#[utoipa::path(
    post,
    path = "/units/{unit_id}/topics",
    tag = "topics",
    params(("unit_id" = i32, Path, description = "Unit ID")),
    request_body = CreateTopicRequest,
    responses(
        (status = 200, description = "Topic created", body = TopicResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unit not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_topic(
    State(state): State<AppState>,
    ValidatedPath(unit_id): ValidatedPath<i32>,
    ValidatedJson(request): ValidatedJson<CreateTopicRequest>,
) -> ApiResult<Json<TopicResponse>> {
    let topic = state.repository.create_topic(unit_id, &request.name).await?;
    info!("Topic {} created in unit {}", topic.id, unit_id);
    Ok(Json(topic.into()))
}

/// Set the completion status of a topic
#[utoipa::path(
    put,
    path = "/topics/{topic_id}/status",
    tag = "topics",
    params(("topic_id" = i32, Path, description = "Topic ID")),
    request_body = UpdateTopicStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Invalid status", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_topic_status(
    State(state): State<AppState>,
    ValidatedPath(topic_id): ValidatedPath<i32>,
    ValidatedJson(request): ValidatedJson<UpdateTopicStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .repository
        .update_topic_status(topic_id, &request.status)
        .await?;
    info!("Topic {} set to {:?}", topic_id, request.status);
    Ok(Json(MessageResponse::new("Status updated")))
}

/// Delete a topic
#[utoipa::path(
    delete,
    path = "/topics/{topic_id}",
    tag = "topics",
    params(("topic_id" = i32, Path, description = "Topic ID")),
    responses(
        (status = 200, description = "Topic deleted", body = MessageResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_topic(
    State(state): State<AppState>,
    ValidatedPath(topic_id): ValidatedPath<i32>,
) -> ApiResult<Json<MessageResponse>> {
    state.repository.delete_topic(topic_id).await?;
    info!("Topic {} deleted", topic_id);
    Ok(Json(MessageResponse::new("Topic deleted")))
}
