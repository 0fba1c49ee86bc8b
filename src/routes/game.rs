use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::game::{
        GameStateResponse, MakeMoveRequest, MoveResponse, SettleResponse, StartGameRequest,
        StartGameResponse,
    },
    error::AppError,
    routes::{
        extract::{JsonBody, ValidJson},
        identity::Actor,
    },
    services::game_service,
    state::SharedState,
};

/// Game creation, moves and snapshots.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/start", post(start_game))
        .route("/games/{id}", get(game_state))
        .route("/games/{id}/move", post(make_move))
        .route("/games/{id}/settle", post(settle_game))
}

/// Start a game against another registered player; the caller plays X.
#[utoipa::path(
    post,
    path = "/games/start",
    tag = "game",
    params(("X-User-Id" = Uuid, Header, description = "Caller id returned by /login")),
    request_body = StartGameRequest,
    responses(
        (status = 201, description = "Game created", body = StartGameResponse),
        (status = 400, description = "Cannot play against yourself"),
        (status = 401, description = "Missing or unknown caller"),
        (status = 404, description = "Opponent not found")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Actor(actor): Actor,
    ValidJson(payload): ValidJson<StartGameRequest>,
) -> Result<(StatusCode, Json<StartGameResponse>), AppError> {
    let response = game_service::start_game(&state, actor, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Play a move.
#[utoipa::path(
    post,
    path = "/games/{id}/move",
    tag = "game",
    params(
        ("id" = Uuid, Path, description = "Game identifier"),
        ("X-User-Id" = Uuid, Header, description = "Caller id returned by /login")
    ),
    request_body = MakeMoveRequest,
    responses(
        (status = 200, description = "Move accepted", body = MoveResponse),
        (status = 400, description = "Malformed body, game finished, out of bounds, or cell occupied"),
        (status = 403, description = "Not a participant, wrong symbol, or not your turn"),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Game changed concurrently; re-read and retry"),
        (status = 500, description = "Move stored but player records not fully updated")
    )
)]
pub async fn make_move(
    State(state): State<SharedState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<MakeMoveRequest>,
) -> Result<Json<MoveResponse>, AppError> {
    Ok(Json(game_service::make_move(&state, id, actor, payload).await?))
}

/// Current board and status of a game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game snapshot", body = GameStateResponse),
        (status = 404, description = "Game not found")
    )
)]
pub async fn game_state(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameStateResponse>, AppError> {
    Ok(Json(game_service::get_game_state(&state, id).await?))
}

/// Re-record a finished game's result on both players.
#[utoipa::path(
    post,
    path = "/games/{id}/settle",
    tag = "game",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Both players' records reflect the result", body = SettleResponse),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Game is still ongoing"),
        (status = 500, description = "Player records still not fully updated")
    )
)]
pub async fn settle_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SettleResponse>, AppError> {
    Ok(Json(game_service::settle_game(&state, id).await?))
}
