use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::user::GameHistoryEntry, error::AppError, services::user_service, state::SharedState,
};

/// Per-user game history.
pub fn router() -> Router<SharedState> {
    Router::new().route("/users/{id}/games", get(user_games))
}

/// Games a user took part in, newest first.
#[utoipa::path(
    get,
    path = "/users/{id}/games",
    tag = "stats",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Game history", body = [GameHistoryEntry]),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_games(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GameHistoryEntry>>, AppError> {
    Ok(Json(user_service::user_games(&state, id).await?))
}
