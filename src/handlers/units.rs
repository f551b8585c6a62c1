use axum::{
    extract::State,
    response::Json,
};
use model::entities::unit;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use super::topics::TopicResponse;
use crate::error::ApiResult;
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::schemas::{AppState, MessageResponse};

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUnitRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UnitResponse {
    pub id: i32,
    pub name: String,
}

impl From<unit::Model> for UnitResponse {
    fn from(model: unit::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// A unit with its topics inlined
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UnitWithTopicsResponse {
    pub id: i32,
    pub name: String,
    pub topics: Vec<TopicResponse>,
}

/// List the units of a subject, each with its topics
#[utoipa::path(
    get,
    path = "/subjects/{subject_id}/units",
    tag = "units",
    params(("subject_id" = i32, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Units ordered by id", body = Vec<UnitWithTopicsResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_units(
    State(state): State<AppState>,
    ValidatedPath(subject_id): ValidatedPath<i32>,
) -> ApiResult<Json<Vec<UnitWithTopicsResponse>>> {
    let units = state.repository.list_units(subject_id).await?;
    debug!("Found {} units in subject {}", units.len(), subject_id);

    let response = units
        .into_iter()
        .map(|(unit, topics)| UnitWithTopicsResponse {
            id: unit.id,
            name: unit.name,
            topics: topics.into_iter().map(TopicResponse::from).collect(),
        })
        .collect();
    Ok(Json(response))
}

/// Add a unit to a subject
#[utoipa::path(
    post,
    path = "/subjects/{subject_id}/units",
    tag = "units",
    params(("subject_id" = i32, Path, description = "Subject ID")),
    request_body = CreateUnitRequest,
    responses(
        (status = 200, description = "Unit created", body = UnitResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_unit(
    State(state): State<AppState>,
    ValidatedPath(subject_id): ValidatedPath<i32>,
    ValidatedJson(request): ValidatedJson<CreateUnitRequest>,
) -> ApiResult<Json<UnitResponse>> {
    let unit = state
        .repository
        .create_unit(subject_id, &request.name)
        .await?;
    info!("Unit {} created in subject {}", unit.id, subject_id);
    Ok(Json(unit.into()))
}

/// Delete a unit together with its topics and notes
#[utoipa::path(
    delete,
    path = "/units/{unit_id}",
    tag = "units",
    params(("unit_id" = i32, Path, description = "Unit ID")),
    responses(
        (status = 200, description = "Unit deleted", body = MessageResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_unit(
    State(state): State<AppState>,
    ValidatedPath(unit_id): ValidatedPath<i32>,
) -> ApiResult<Json<MessageResponse>> {
    state.repository.delete_unit(unit_id).await?;
    info!("Unit {} deleted", unit_id);
    Ok(Json(MessageResponse::new("Unit deleted")))
}
