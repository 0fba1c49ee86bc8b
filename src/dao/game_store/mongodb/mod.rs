mod config;
mod connection;
mod error;
mod models;
/// Collection access and the [`GameStore`](crate::dao::game_store::GameStore) impl.
pub mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoGameStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::Conflict {
                id,
                expected_version,
            } => StorageError::Conflict {
                id,
                expected_version,
            },
            MongoDaoError::NotFound { entity, id } => StorageError::NotFound { entity, id },
            MongoDaoError::DuplicateUsername { username } => StorageError::AlreadyExists {
                entity: "user",
                key: username,
            },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
