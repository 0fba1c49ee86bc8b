use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB DAO operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB backend, each tagged with the operation that
/// produced it.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection string could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The driver refused the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered during startup.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings sent before giving up.
        attempts: u32,
        /// Error of the last ping.
        #[source]
        source: MongoError,
    },
    /// A periodic ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// An index could not be created.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Index name.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Inserting or replacing a game failed.
    #[error("failed to save game `{id}`")]
    SaveGame {
        /// Game being written.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading a game failed.
    #[error("failed to load game `{id}`")]
    LoadGame {
        /// Game being read.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Listing a player's games failed.
    #[error("failed to list games of user `{user_id}`")]
    ListGames {
        /// Player whose games were listed.
        user_id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Writing a user failed.
    #[error("failed to save user `{id}`")]
    SaveUser {
        /// User being written.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading a user failed.
    #[error("failed to load user `{key}`")]
    LoadUser {
        /// Id or username that was looked up.
        key: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Listing users failed.
    #[error("failed to list users")]
    ListUsers {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A stored document could not be mapped back to an entity.
    #[error("stored {entity} document has malformed field `{field}`: {value}")]
    MalformedDocument {
        /// Kind of document.
        entity: &'static str,
        /// Offending field.
        field: &'static str,
        /// Raw stored value.
        value: String,
    },
    /// The version filter of a conditional replace matched nothing.
    #[error("game `{id}` changed since version {expected_version} was read")]
    Conflict {
        /// Game written concurrently.
        id: Uuid,
        /// Version the losing writer had read.
        expected_version: u64,
    },
    /// The addressed document does not exist.
    #[error("{entity} `{id}` not found")]
    NotFound {
        /// Kind of document.
        entity: &'static str,
        /// Identifier that was looked up.
        id: Uuid,
    },
    /// The unique username index rejected an insert.
    #[error("username `{username}` is already taken")]
    DuplicateUsername {
        /// The duplicated username.
        username: String,
    },
}
