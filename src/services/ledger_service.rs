//! Settlement of finished games into the players' outcome sets.
//!
//! Each player's update is an independent idempotent upsert, so a settlement
//! can be replayed any number of times. Updates are retried with a bounded
//! backoff; players still pending once the budget is spent are reported in
//! [`LedgerError::Inconsistent`].

use futures::future::join_all;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        game_store::GameStore,
        models::OutcomeKind,
        storage::{StorageError, StorageResult},
    },
    retry::Backoff,
    state::game::{Game, MoveOutcome},
};

/// The game is finished but not every player's record reflects it.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Some outcome updates were still failing when the retry budget ran out.
    #[error("game `{game_id}` is finished but the records of {pending:?} could not be updated")]
    Inconsistent {
        /// The finished game.
        game_id: Uuid,
        /// Players whose outcome sets do not contain the game yet.
        pending: Vec<Uuid>,
    },
}

/// Outcome each seat receives for a terminal `outcome`. The winner is the
/// player seated on the winning symbol.
fn settlements(game: &Game, outcome: MoveOutcome) -> Vec<(Uuid, OutcomeKind)> {
    match outcome {
        MoveOutcome::Continued => Vec::new(),
        MoveOutcome::Won { symbol, .. } => vec![
            (game.player_for(symbol), OutcomeKind::Win),
            (game.player_for(symbol.opponent()), OutcomeKind::Loss),
        ],
        MoveOutcome::Drawn => vec![
            (game.player_x, OutcomeKind::Draw),
            (game.player_o, OutcomeKind::Draw),
        ],
    }
}

/// Record a terminal outcome for both players. A no-op for
/// [`MoveOutcome::Continued`].
pub async fn record_result(
    store: &dyn GameStore,
    game: &Game,
    outcome: MoveOutcome,
    backoff: Backoff,
) -> Result<(), LedgerError> {
    let updates = settlements(game, outcome);
    if updates.is_empty() {
        return Ok(());
    }

    let results = join_all(
        updates
            .iter()
            .map(|&(user_id, kind)| record_with_retry(store, user_id, game.id, kind, backoff)),
    )
    .await;

    let pending: Vec<Uuid> = updates
        .iter()
        .zip(results)
        .filter_map(|(&(user_id, _), result)| result.err().map(|_| user_id))
        .collect();

    if pending.is_empty() {
        info!(game_id = %game.id, ?outcome, "game result recorded");
        Ok(())
    } else {
        error!(game_id = %game.id, ?pending, "game result only partially recorded");
        Err(LedgerError::Inconsistent {
            game_id: game.id,
            pending,
        })
    }
}

async fn record_with_retry(
    store: &dyn GameStore,
    user_id: Uuid,
    game_id: Uuid,
    kind: OutcomeKind,
    backoff: Backoff,
) -> StorageResult<()> {
    let mut attempt = 1;
    let mut delay = backoff.initial_delay;

    loop {
        match store.upsert_user_outcome(user_id, game_id, kind).await {
            Ok(()) => {
                debug!(%user_id, %game_id, ?kind, attempt, "outcome recorded");
                return Ok(());
            }
            // A missing user will not appear by waiting.
            Err(err @ StorageError::NotFound { .. }) => {
                warn!(%user_id, %game_id, error = %err, "cannot record outcome for unknown user");
                return Err(err);
            }
            Err(err) if attempt >= backoff.max_attempts => {
                warn!(%user_id, %game_id, attempt, error = %err, "giving up on outcome update");
                return Err(err);
            }
            Err(err) => {
                warn!(%user_id, %game_id, attempt, error = %err, "outcome update failed; retrying");
                sleep(delay).await;
                delay = backoff.next_delay(delay);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU32, Ordering},
        },
        time::{Duration, SystemTime},
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::dao::{
        game_store::memory::InMemoryGameStore,
        models::{GameEntity, UserEntity},
    };
    use crate::state::board::Symbol;

    const FAST: Backoff = Backoff {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    };

    /// Delegates to the in-memory store but fails outcome updates for one
    /// user a configurable number of times.
    struct FlakyStore {
        inner: InMemoryGameStore,
        flaky_user: Uuid,
        failures_left: Arc<AtomicU32>,
    }

    impl FlakyStore {
        fn inner(&self) -> &dyn GameStore {
            &self.inner
        }
    }

    impl GameStore for FlakyStore {
        fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
            self.inner().find_game(id)
        }

        fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner().insert_game(game)
        }

        fn save_game(
            &self,
            game: GameEntity,
            expected_version: u64,
        ) -> BoxFuture<'static, StorageResult<()>> {
            self.inner().save_game(game, expected_version)
        }

        fn list_user_games(
            &self,
            user_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
            self.inner().list_user_games(user_id)
        }

        fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
            self.inner().find_user(id)
        }

        fn find_user_by_username(
            &self,
            username: String,
        ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
            self.inner().find_user_by_username(username)
        }

        fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner().insert_user(user)
        }

        fn upsert_user_outcome(
            &self,
            user_id: Uuid,
            game_id: Uuid,
            kind: OutcomeKind,
        ) -> BoxFuture<'static, StorageResult<()>> {
            if user_id == self.flaky_user
                && self
                    .failures_left
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                    .is_ok()
            {
                let err = StorageError::unavailable(
                    "injected failure".into(),
                    std::io::Error::other("connection reset"),
                );
                return Box::pin(async move { Err(err) });
            }
            self.inner().upsert_user_outcome(user_id, game_id, kind)
        }

        fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
            self.inner().list_users()
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner().health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner().try_reconnect()
        }
    }

    async fn seeded() -> (InMemoryGameStore, Game) {
        let store = InMemoryGameStore::new();
        let alice = UserEntity::new("alice".into(), "pw".into());
        let bob = UserEntity::new("bob".into(), "pw".into());
        let game = Game::new(alice.id, bob.id).unwrap();
        GameStore::insert_user(&store, alice).await.unwrap();
        GameStore::insert_user(&store, bob).await.unwrap();
        (store, game)
    }

    async fn user(store: &dyn GameStore, id: Uuid) -> UserEntity {
        store.find_user(id).await.unwrap().unwrap()
    }

    fn x_wins(game: &Game) -> MoveOutcome {
        MoveOutcome::Won {
            symbol: Symbol::X,
            actor: game.player_x,
        }
    }

    #[tokio::test]
    async fn win_is_recorded_once_however_often_it_is_settled() {
        let (store, game) = seeded().await;

        for _ in 0..3 {
            record_result(&store, &game, x_wins(&game), FAST)
                .await
                .unwrap();
        }

        let winner = user(&store, game.player_x).await;
        let loser = user(&store, game.player_o).await;
        assert_eq!(winner.wins.len(), 1);
        assert!(winner.losses.is_empty() && winner.draws.is_empty());
        assert_eq!(loser.losses.len(), 1);
        assert!(!loser.wins.contains(&game.id));
    }

    #[tokio::test]
    async fn winner_follows_the_symbol_not_the_actor() {
        let (store, game) = seeded().await;
        let outcome = MoveOutcome::Won {
            symbol: Symbol::O,
            actor: game.player_x,
        };

        record_result(&store, &game, outcome, FAST).await.unwrap();

        assert!(user(&store, game.player_o).await.wins.contains(&game.id));
        assert!(user(&store, game.player_x).await.losses.contains(&game.id));
    }

    #[tokio::test]
    async fn draw_is_recorded_for_both_players() {
        let (store, game) = seeded().await;
        record_result(&store, &game, MoveOutcome::Drawn, FAST)
            .await
            .unwrap();

        for id in [game.player_x, game.player_o] {
            let user = user(&store, id).await;
            assert!(user.draws.contains(&game.id));
            assert!(user.wins.is_empty() && user.losses.is_empty());
        }
    }

    #[tokio::test]
    async fn continued_game_is_not_recorded() {
        let (store, game) = seeded().await;
        record_result(&store, &game, MoveOutcome::Continued, FAST)
            .await
            .unwrap();
        assert!(user(&store, game.player_x).await.recorded_outcome(game.id).is_none());
    }

    #[tokio::test]
    async fn transient_failures_within_budget_are_absorbed() {
        let (inner, game) = seeded().await;
        let store = FlakyStore {
            inner: inner.clone(),
            flaky_user: game.player_o,
            failures_left: Arc::new(AtomicU32::new(FAST.max_attempts - 1)),
        };

        record_result(&store, &game, x_wins(&game), FAST)
            .await
            .unwrap();
        assert!(user(&inner, game.player_o).await.losses.contains(&game.id));
    }

    #[tokio::test]
    async fn exhausted_budget_reports_pending_players_and_can_be_replayed() {
        let (inner, game) = seeded().await;
        let failures_left = Arc::new(AtomicU32::new(u32::MAX));
        let store = FlakyStore {
            inner: inner.clone(),
            flaky_user: game.player_o,
            failures_left: failures_left.clone(),
        };

        let err = record_result(&store, &game, x_wins(&game), FAST)
            .await
            .unwrap_err();
        let LedgerError::Inconsistent { game_id, pending } = err;
        assert_eq!(game_id, game.id);
        assert_eq!(pending, vec![game.player_o]);

        // The other player's update is independent and already applied.
        assert!(user(&inner, game.player_x).await.wins.contains(&game.id));
        assert!(user(&inner, game.player_o).await.recorded_outcome(game.id).is_none());

        failures_left.store(0, Ordering::SeqCst);
        record_result(&store, &game, x_wins(&game), FAST)
            .await
            .unwrap();

        assert_eq!(user(&inner, game.player_x).await.wins.len(), 1);
        assert!(user(&inner, game.player_o).await.losses.contains(&game.id));
    }

    #[tokio::test]
    async fn unknown_player_is_reported_without_retrying() {
        let store = InMemoryGameStore::new();
        let known = UserEntity::new("carol".into(), "pw".into());
        let game = Game::new(known.id, Uuid::new_v4()).unwrap();
        GameStore::insert_user(&store, known).await.unwrap();

        let started = SystemTime::now();
        let slow = Backoff {
            max_attempts: 5,
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(10),
        };
        let err = record_result(&store, &game, MoveOutcome::Drawn, slow)
            .await
            .unwrap_err();

        let LedgerError::Inconsistent { pending, .. } = err;
        assert_eq!(pending, vec![game.player_o]);
        assert!(started.elapsed().unwrap() < Duration::from_secs(10));
    }
}
