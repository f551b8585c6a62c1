use axum::{
    extract::State,
    response::Json,
};
use common::Progress;
use tracing::{debug, instrument};

use crate::error::ApiResult;
use crate::extract::ValidatedPath;
use crate::schemas::{AppState, ErrorResponse};

/// Percentage of a unit's topics that are completed
#[utoipa::path(
    get,
    path = "/units/{unit_id}/progress",
    tag = "progress",
    params(("unit_id" = i32, Path, description = "Unit ID")),
    responses(
        (status = 200, description = "Completion percentage, 0 when the unit has no topics", body = Progress),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_unit_progress(
    State(state): State<AppState>,
    ValidatedPath(unit_id): ValidatedPath<i32>,
) -> ApiResult<Json<Progress>> {
    let progress = state.progress.unit_progress(unit_id).await?;
    debug!("Unit {} progress: {}%", unit_id, progress.progress);
    Ok(Json(progress))
}

/// Percentage of completed topics across all units of a subject
#[utoipa::path(
    get,
    path = "/subjects/{subject_id}/progress",
    tag = "progress",
    params(("subject_id" = i32, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Completion percentage, 0 when the subject has no topics", body = Progress),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_subject_progress(
    State(state): State<AppState>,
    ValidatedPath(subject_id): ValidatedPath<i32>,
) -> ApiResult<Json<Progress>> {
    let progress = state.progress.subject_progress(subject_id).await?;
    debug!("Subject {} progress: {}%", subject_id, progress.progress);
    Ok(Json(progress))
}
