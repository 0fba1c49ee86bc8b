use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::state::leaderboard::Standing;

/// Query string accepted by `/leaderboard`.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
pub struct LeaderboardQuery {
    /// Maximum number of entries; the configured default applies when omitted.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

/// One ranked player.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Player's login name.
    pub username: String,
    /// Games won.
    pub win_count: usize,
    /// Games lost.
    pub loss_count: usize,
    /// Games drawn.
    pub draw_count: usize,
}

impl From<Standing> for LeaderboardEntry {
    fn from(standing: Standing) -> Self {
        Self {
            username: standing.username,
            win_count: standing.win_count,
            loss_count: standing.loss_count,
            draw_count: standing.draw_count,
        }
    }
}
