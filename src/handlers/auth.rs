use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::schemas::{AppState, ErrorResponse, MessageResponse};

/// Request body for creating an account
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

/// Request body for exchanging credentials for a token
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header
    pub access_token: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 400, description = "Missing fields or email already registered", body = ErrorResponse),
        (status = 500, description = "Password could not be processed", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    trace!("Entering signup function");

    let user_id = state
        .credentials
        .register(&request.email, &request.password)
        .await?;

    info!("User {} signed up", user_id);
    Ok((StatusCode::CREATED, Json(MessageResponse::new("User created"))))
}

/// Log in and receive an access token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Token could not be issued", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    trace!("Entering login function");

    let user_id = state
        .credentials
        .verify(&request.email, &request.password)
        .await?;
    let access_token = state.tokens.issue_token(user_id)?;

    debug!("Issued access token for user {}", user_id);
    Ok(Json(LoginResponse { access_token }))
}
