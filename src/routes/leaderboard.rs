use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::leaderboard::{LeaderboardEntry, LeaderboardQuery},
    error::AppError,
    routes::extract::ValidQuery,
    services::leaderboard_service,
    state::SharedState,
};

/// Ranked player standings.
pub fn router() -> Router<SharedState> {
    Router::new().route("/leaderboard", get(leaderboard))
}

/// Players ranked by wins, ties broken by username.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "stats",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked players", body = [LeaderboardEntry]),
        (status = 400, description = "Limit outside 1..=100")
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    ValidQuery(query): ValidQuery<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    Ok(Json(
        leaderboard_service::rank_leaderboard(&state, query.limit).await?,
    ))
}
