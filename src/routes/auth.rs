use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::auth::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
    error::AppError,
    routes::extract::ValidJson,
    services::user_service,
    state::SharedState,
};

/// Account creation and login.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a new player.
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Invalid username or password"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let response = user_service::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange credentials for the id to send as `X-User-Id`.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(user_service::login(&state, payload).await?))
}
