//! Accounts and identity: registration, login, caller resolution and
//! per-user game history.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{models::UserEntity, storage::StorageError},
    dto::{
        auth::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
        user::GameHistoryEntry,
    },
    error::ServiceError,
    state::{SharedState, game::Game},
};

/// Create an account; usernames are unique.
pub async fn register(
    state: &SharedState,
    request: RegisterRequest,
) -> Result<MessageResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let user = UserEntity::new(request.username, request.password);
    let (user_id, username) = (user.id, user.username.clone());

    store.insert_user(user).await.map_err(|err| match err {
        StorageError::AlreadyExists { .. } => {
            ServiceError::Conflict("Username already exists.".into())
        }
        other => other.into(),
    })?;

    info!(%user_id, %username, "user registered");
    Ok(MessageResponse::new("User registered successfully."))
}

/// Check credentials and hand back the identity to send as `X-User-Id`.
pub async fn login(
    state: &SharedState,
    request: LoginRequest,
) -> Result<LoginResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let user = store
        .find_user_by_username(request.username)
        .await?
        .filter(|user| user.password == request.password)
        .ok_or_else(|| ServiceError::Unauthorized("Invalid username or password.".into()))?;

    Ok(LoginResponse {
        message: "Login successful.".into(),
        user_id: user.id,
    })
}

/// Resolve the caller named by the identity header.
pub async fn resolve_actor(state: &SharedState, actor: Uuid) -> Result<UserEntity, ServiceError> {
    let store = state.require_game_store().await?;
    store
        .find_user(actor)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("Invalid user.".into()))
}

/// Games the user took part in, newest first.
pub async fn user_games(
    state: &SharedState,
    user_id: Uuid,
) -> Result<Vec<GameHistoryEntry>, ServiceError> {
    let store = state.require_game_store().await?;
    if store.find_user(user_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("user `{user_id}` not found")));
    }

    let games = store.list_user_games(user_id).await?;
    Ok(games
        .into_iter()
        .map(Game::from)
        .filter_map(|game| GameHistoryEntry::for_player(&game, user_id))
        .collect())
}
