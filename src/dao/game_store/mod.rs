/// Process-local store backed by concurrent maps.
pub mod memory;
/// MongoDB-backed store.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{GameEntity, OutcomeKind, UserEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for games and users.
pub trait GameStore: Send + Sync {
    /// Load a game by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Persist a brand-new game.
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace a game only if the stored copy is still at `expected_version`,
    /// failing with [`StorageError::Conflict`](crate::dao::storage::StorageError::Conflict)
    /// otherwise.
    fn save_game(
        &self,
        game: GameEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Games where the user holds a seat, newest first.
    fn list_user_games(&self, user_id: Uuid)
    -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Load a user by id.
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Load a user by exact username.
    fn find_user_by_username(
        &self,
        username: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Register a user; usernames are unique.
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Add `game_id` to one of the user's outcome sets. Idempotent per
    /// `(user_id, game_id)`: a game already present in any set is left alone.
    fn upsert_user_outcome(
        &self,
        user_id: Uuid,
        game_id: Uuid,
        kind: OutcomeKind,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Every registered user, in no particular order.
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Check that the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
