use std::error::Error;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or failed mid-operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What the backend was doing.
        message: String,
        /// Backend-specific cause.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A conditional write lost against a concurrent update.
    #[error("game `{id}` changed since version {expected_version} was read")]
    Conflict {
        /// Game that was written concurrently.
        id: Uuid,
        /// Version the losing writer had read.
        expected_version: u64,
    },
    /// The addressed record does not exist.
    #[error("{entity} `{id}` not found")]
    NotFound {
        /// Kind of record, `game` or `user`.
        entity: &'static str,
        /// Identifier that was looked up.
        id: Uuid,
    },
    /// A unique key is already taken.
    #[error("{entity} `{key}` already exists")]
    AlreadyExists {
        /// Kind of record.
        entity: &'static str,
        /// The duplicated key.
        key: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
