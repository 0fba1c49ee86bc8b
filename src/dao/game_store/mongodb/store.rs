use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, MongoUserDocument, doc_id, version_filter},
};
use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, OutcomeKind, UserEntity},
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const USER_COLLECTION_NAME: &str = "users";
const DUPLICATE_KEY_CODE: i32 = 11000;

/// [`GameStore`] over the `games` and `users` collections.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        info!(database = %self.config.database_name, "MongoDB connection re-established");
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let users = self.users().await;
        let username_index = IndexModel::builder()
            .keys(doc! {"username": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("username_unique_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();
        users
            .create_index(username_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: USER_COLLECTION_NAME,
                index: "username",
                source,
            })?;

        // History lookups filter on either seat and sort by creation time.
        let games = self.games().await;
        for (field, name) in [
            ("player_x", "player_x_created_idx"),
            ("player_o", "player_o_created_idx"),
        ] {
            let mut keys = Document::new();
            keys.insert(field, 1);
            keys.insert("created_at", -1);
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(Some(name.to_owned())).build())
                .build();
            games
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: GAME_COLLECTION_NAME,
                    index: name,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        self.database()
            .await
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn users(&self) -> Collection<MongoUserDocument> {
        self.database()
            .await
            .collection::<MongoUserDocument>(USER_COLLECTION_NAME)
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        document.map(GameEntity::try_from).transpose()
    }

    async fn insert_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        self.games()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;
        Ok(())
    }

    /// Replace the game document only while its stored version still matches.
    async fn save_game(&self, game: GameEntity, expected_version: u64) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        let collection = self.games().await;

        let result = collection
            .replace_one(version_filter(id, expected_version), &document)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;

        if result.matched_count == 0 {
            let exists = collection
                .count_documents(doc_id(id))
                .await
                .map_err(|source| MongoDaoError::LoadGame { id, source })?;
            return Err(if exists == 0 {
                MongoDaoError::NotFound { entity: "game", id }
            } else {
                MongoDaoError::Conflict {
                    id,
                    expected_version,
                }
            });
        }

        Ok(())
    }

    async fn list_user_games(&self, user_id: Uuid) -> MongoResult<Vec<GameEntity>> {
        let key = user_id.to_string();
        let documents: Vec<MongoGameDocument> = self
            .games()
            .await
            .find(doc! {"$or": [{"player_x": key.clone()}, {"player_o": key}]})
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::ListGames { user_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { user_id, source })?;

        documents.into_iter().map(GameEntity::try_from).collect()
    }

    async fn find_user_where(&self, filter: Document, key: String) -> MongoResult<Option<UserEntity>> {
        let document = self
            .users()
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::LoadUser { key, source })?;

        document.map(UserEntity::try_from).transpose()
    }

    async fn insert_user(&self, user: UserEntity) -> MongoResult<()> {
        let id = user.id;
        let username = user.username.clone();
        let document: MongoUserDocument = user.into();

        match self.users().await.insert_one(&document).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => {
                Err(MongoDaoError::DuplicateUsername { username })
            }
            Err(source) => Err(MongoDaoError::SaveUser { id, source }),
        }
    }

    /// `$addToSet` guarded by a filter that skips users already holding the
    /// game in any outcome set.
    async fn upsert_user_outcome(
        &self,
        user_id: Uuid,
        game_id: Uuid,
        kind: OutcomeKind,
    ) -> MongoResult<()> {
        let game_key = game_id.to_string();
        let collection = self.users().await;

        let mut filter = doc_id(user_id);
        for set in [OutcomeKind::Win, OutcomeKind::Loss, OutcomeKind::Draw] {
            filter.insert(set.field(), doc! {"$ne": game_key.as_str()});
        }
        let mut addition = Document::new();
        addition.insert(kind.field(), game_key.as_str());

        let result = collection
            .update_one(filter, doc! {"$addToSet": addition})
            .await
            .map_err(|source| MongoDaoError::SaveUser {
                id: user_id,
                source,
            })?;

        if result.matched_count == 0 {
            let exists = collection
                .count_documents(doc_id(user_id))
                .await
                .map_err(|source| MongoDaoError::LoadUser {
                    key: user_id.to_string(),
                    source,
                })?;
            if exists == 0 {
                return Err(MongoDaoError::NotFound {
                    entity: "user",
                    id: user_id,
                });
            }
            debug!(%user_id, %game_id, "outcome already recorded");
        }

        Ok(())
    }

    async fn list_users(&self) -> MongoResult<Vec<UserEntity>> {
        let documents: Vec<MongoUserDocument> = self
            .users()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListUsers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListUsers { source })?;

        documents.into_iter().map(UserEntity::try_from).collect()
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(failure)) if failure.code == DUPLICATE_KEY_CODE
    )
}

impl GameStore for MongoGameStore {
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await.map_err(Into::into) })
    }

    fn save_game(
        &self,
        game: GameEntity,
        expected_version: u64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .save_game(game, expected_version)
                .await
                .map_err(Into::into)
        })
    }

    fn list_user_games(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_user_games(user_id).await.map_err(Into::into) })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_user_where(doc_id(id), id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn find_user_by_username(
        &self,
        username: String,
    ) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_user_where(doc! {"username": username.as_str()}, username)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_user(user).await.map_err(Into::into) })
    }

    fn upsert_user_outcome(
        &self,
        user_id: Uuid,
        game_id: Uuid,
        kind: OutcomeKind,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upsert_user_outcome(user_id, game_id, kind)
                .await
                .map_err(Into::into)
        })
    }

    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_users().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
