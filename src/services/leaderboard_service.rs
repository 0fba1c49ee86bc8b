//! Leaderboard read path over the registered users' outcome sets.

use tracing::debug;

use crate::{
    dto::leaderboard::LeaderboardEntry,
    error::ServiceError,
    state::{
        SharedState,
        leaderboard::{Standing, rank},
    },
};

/// Top players by wins, ties broken by username. `limit` defaults to the
/// configured leaderboard size.
pub async fn rank_leaderboard(
    state: &SharedState,
    limit: Option<usize>,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let store = state.require_game_store().await?;
    let users = store.list_users().await?;
    let limit = limit.unwrap_or_else(|| state.config().leaderboard_limit());
    debug!(users = users.len(), limit, "ranking leaderboard");

    Ok(rank(users.iter().map(Standing::from), limit)
        .into_iter()
        .map(LeaderboardEntry::from)
        .collect())
}
