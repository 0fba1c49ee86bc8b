//! Ranking of players by their recorded outcomes.

use crate::dao::models::UserEntity;

/// Number of entries returned when the caller does not ask for a limit.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// One player's aggregate record as shown on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// Player's login name, also the tie-breaker.
    pub username: String,
    /// Size of the player's win set; the ranking key.
    pub win_count: usize,
    /// Size of the player's loss set.
    pub loss_count: usize,
    /// Size of the player's draw set.
    pub draw_count: usize,
}

impl From<&UserEntity> for Standing {
    fn from(user: &UserEntity) -> Self {
        Self {
            username: user.username.clone(),
            win_count: user.wins.len(),
            loss_count: user.losses.len(),
            draw_count: user.draws.len(),
        }
    }
}

/// Order standings by wins (descending) then username (ascending), keeping at
/// most `limit` entries.
pub fn rank<I>(standings: I, limit: usize) -> Vec<Standing>
where
    I: IntoIterator<Item = Standing>,
{
    let mut ranked: Vec<Standing> = standings.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.win_count
            .cmp(&a.win_count)
            .then_with(|| a.username.cmp(&b.username))
    });
    ranked.truncate(limit);
    ranked
}
