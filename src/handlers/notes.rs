use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::note;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::{ValidatedJson, ValidatedPath};
use crate::schemas::{AppState, ErrorResponse, MessageResponse};

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateNoteRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct NoteResponse {
    pub id: i32,
    pub content: String,
}

impl From<note::Model> for NoteResponse {
    fn from(model: note::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
        }
    }
}

/// List the notes of a unit, newest first
#[utoipa::path(
    get,
    path = "/units/{unit_id}/notes",
    tag = "notes",
    params(("unit_id" = i32, Path, description = "Unit ID")),
    responses(
        (status = 200, description = "Notes, newest first", body = Vec<NoteResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_notes(
    State(state): State<AppState>,
    ValidatedPath(unit_id): ValidatedPath<i32>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let notes = state.repository.list_notes(unit_id).await?;
    debug!("Found {} notes in unit {}", notes.len(), unit_id);
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

/// Attach a note to a unit
#[utoipa::path(
    post,
    path = "/units/{unit_id}/notes",
    tag = "notes",
    params(("unit_id" = i32, Path, description = "Unit ID")),
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = NoteResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unit not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_note(
    State(state): State<AppState>,
    ValidatedPath(unit_id): ValidatedPath<i32>,
    ValidatedJson(request): ValidatedJson<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<NoteResponse>)> {
    let note = state
        .repository
        .create_note(unit_id, &request.content)
        .await?;
    info!("Note {} added to unit {}", note.id, unit_id);
    Ok((StatusCode::CREATED, Json(note.into())))
}

/// Delete a note
#[utoipa::path(
    delete,
    path = "/notes/{note_id}",
    tag = "notes",
    params(("note_id" = i32, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note deleted", body = MessageResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_note(
    State(state): State<AppState>,
    ValidatedPath(note_id): ValidatedPath<i32>,
) -> ApiResult<Json<MessageResponse>> {
    state.repository.delete_note(note_id).await?;
    info!("Note {} deleted", note_id);
    Ok(Json(MessageResponse::new("Note deleted")))
}
