use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::format_system_time,
    state::game::{Game, GameResult},
};

/// A game seen from one participant's side.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryResult {
    /// The player won.
    Win,
    /// The opponent won.
    Loss,
    /// Nobody won.
    Draw,
    /// Still being played.
    Ongoing,
}

impl HistoryResult {
    fn for_player(game: &Game, user_id: Uuid) -> Self {
        match game.result {
            None => HistoryResult::Ongoing,
            Some(GameResult::Draw) => HistoryResult::Draw,
            Some(GameResult::Win { winner, .. }) if winner == user_id => HistoryResult::Win,
            Some(GameResult::Win { .. }) => HistoryResult::Loss,
        }
    }
}

/// Entry of `/users/{id}/games`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameHistoryEntry {
    /// Game identifier.
    pub game_id: Uuid,
    /// The other seat.
    pub opponent: Uuid,
    /// Result from the player's side.
    pub result: HistoryResult,
    /// RFC 3339 creation time.
    pub created_at: String,
}

impl GameHistoryEntry {
    /// Project `game` for `user_id`; `None` when the user holds no seat.
    pub fn for_player(game: &Game, user_id: Uuid) -> Option<Self> {
        let opponent = game.opponent_of(user_id)?;
        Some(Self {
            game_id: game.id,
            opponent,
            result: HistoryResult::for_player(game, user_id),
            created_at: format_system_time(game.created_at),
        })
    }
}
