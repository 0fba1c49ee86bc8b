//! Process-local store backed by concurrent maps.
//!
//! Conditional writes are evaluated while holding the map entry, which gives
//! the same compare-and-swap semantics as the filtered updates of the MongoDB
//! backend.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::{self, BoxFuture};
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, OutcomeKind, UserEntity},
    storage::{StorageError, StorageResult},
};

/// [`GameStore`] kept entirely in memory; clones share the same maps.
///
/// Used by tests and by `STORAGE_BACKEND=memory`. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    games: DashMap<Uuid, GameEntity>,
    users: DashMap<Uuid, UserEntity>,
    usernames: DashMap<String, Uuid>,
}

impl InMemoryGameStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_game(&self, game: GameEntity) -> StorageResult<()> {
        match self.inner.games.entry(game.id) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists {
                entity: "game",
                key: game.id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(game);
                Ok(())
            }
        }
    }

    fn save_game(&self, game: GameEntity, expected_version: u64) -> StorageResult<()> {
        let id = game.id;
        let Some(mut stored) = self.inner.games.get_mut(&id) else {
            return Err(StorageError::NotFound { entity: "game", id });
        };

        if stored.version != expected_version {
            return Err(StorageError::Conflict {
                id,
                expected_version,
            });
        }

        *stored = game;
        Ok(())
    }

    fn list_user_games(&self, user_id: Uuid) -> Vec<GameEntity> {
        let mut games: Vec<GameEntity> = self
            .inner
            .games
            .iter()
            .filter(|entry| entry.player_x == user_id || entry.player_o == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        games
    }

    fn insert_user(&self, user: UserEntity) -> StorageResult<()> {
        // The username index entry is the uniqueness guard.
        match self.inner.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists {
                entity: "user",
                key: user.username,
            }),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.inner.users.insert(user.id, user);
                Ok(())
            }
        }
    }

    fn find_user_by_username(&self, username: &str) -> Option<UserEntity> {
        let id = *self.inner.usernames.get(username)?;
        self.inner.users.get(&id).map(|user| user.value().clone())
    }

    fn upsert_user_outcome(
        &self,
        user_id: Uuid,
        game_id: Uuid,
        kind: OutcomeKind,
    ) -> StorageResult<()> {
        let mut user = self
            .inner
            .users
            .get_mut(&user_id)
            .ok_or(StorageError::NotFound {
                entity: "user",
                id: user_id,
            })?;
        user.record_outcome(game_id, kind);
        Ok(())
    }
}

impl GameStore for InMemoryGameStore {
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let game = self.inner.games.get(&id).map(|entry| entry.value().clone());
        Box::pin(future::ready(Ok(game)))
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(InMemoryGameStore::insert_game(self, game)))
    }

    fn save_game(
        &self,
        game: GameEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(InMemoryGameStore::save_game(
            self,
            game,
            expected_version,
        )))
    }

    fn list_user_games(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        Box::pin(future::ready(Ok(InMemoryGameStore::list_user_games(
            self, user_id,
        ))))
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let user = self.inner.users.get(&id).map(|entry| entry.value().clone());
        Box::pin(future::ready(Ok(user)))
    }

    fn find_user_by_username(
        &self,
        username: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        Box::pin(future::ready(Ok(InMemoryGameStore::find_user_by_username(
            self, &username,
        ))))
    }

    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(InMemoryGameStore::insert_user(self, user)))
    }

    fn upsert_user_outcome(
        &self,
        user_id: Uuid,
        game_id: Uuid,
        kind: OutcomeKind,
    ) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(InMemoryGameStore::upsert_user_outcome(
            self, user_id, game_id, kind,
        )))
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let users = self
            .inner
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        Box::pin(future::ready(Ok(users)))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::Game;

    fn stored_game(store: &InMemoryGameStore) -> GameEntity {
        let game: GameEntity = Game::new(Uuid::new_v4(), Uuid::new_v4()).unwrap().into();
        InMemoryGameStore::insert_game(store, game.clone()).unwrap();
        game
    }

    #[tokio::test]
    async fn save_game_requires_expected_version() {
        let store = InMemoryGameStore::new();
        let mut game = stored_game(&store);

        game.version = 1;
        GameStore::save_game(&store, game.clone(), 0).await.unwrap();

        // Second writer still holding version 0 loses.
        let mut stale = game.clone();
        stale.version = 1;
        let err = GameStore::save_game(&store, stale, 0).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Conflict {
                expected_version: 0,
                ..
            }
        ));

        let stored = GameStore::find_game(&store, game.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn save_game_on_unknown_id_is_not_found() {
        let store = InMemoryGameStore::new();
        let game: GameEntity = Game::new(Uuid::new_v4(), Uuid::new_v4()).unwrap().into();
        let err = GameStore::save_game(&store, game, 0).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "game", .. }));
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = InMemoryGameStore::new();
        GameStore::insert_user(&store, UserEntity::new("alice".into(), "a".into()))
            .await
            .unwrap();
        let err = GameStore::insert_user(&store, UserEntity::new("alice".into(), "b".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { entity: "user", .. }));

        let found = GameStore::find_user_by_username(&store, "alice".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.password, "a");
        assert_eq!(GameStore::list_users(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn outcome_upsert_is_idempotent() {
        let store = InMemoryGameStore::new();
        let user = UserEntity::new("bob".into(), "b".into());
        let user_id = user.id;
        GameStore::insert_user(&store, user).await.unwrap();
        let game_id = Uuid::new_v4();

        for _ in 0..3 {
            GameStore::upsert_user_outcome(&store, user_id, game_id, OutcomeKind::Draw)
                .await
                .unwrap();
        }

        let user = GameStore::find_user(&store, user_id).await.unwrap().unwrap();
        assert_eq!(user.draws.len(), 1);
        assert!(user.wins.is_empty() && user.losses.is_empty());

        let err = GameStore::upsert_user_outcome(&store, Uuid::new_v4(), game_id, OutcomeKind::Win)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "user", .. }));
    }

    #[tokio::test]
    async fn user_history_is_newest_first() {
        let store = InMemoryGameStore::new();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let mut older: GameEntity = Game::new(a, b).unwrap().into();
        older.created_at -= std::time::Duration::from_secs(60);
        let newer: GameEntity = Game::new(c, a).unwrap().into();
        let unrelated: GameEntity = Game::new(b, c).unwrap().into();
        for game in [older.clone(), newer.clone(), unrelated] {
            InMemoryGameStore::insert_game(&store, game).unwrap();
        }

        let history = GameStore::list_user_games(&store, a).await.unwrap();
        let ids: Vec<Uuid> = history.iter().map(|game| game.id).collect();
        assert_eq!(ids, [newer.id, older.id]);
    }
}
