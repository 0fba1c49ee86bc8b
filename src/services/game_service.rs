//! Game lifecycle: creation, conditional move writes, snapshots and
//! settlement replay.

use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::game::{
        GameStateResponse, MakeMoveRequest, MoveResponse, SettleResponse, StartGameRequest,
        StartGameResponse,
    },
    error::ServiceError,
    services::{ledger_service, user_service},
    state::{SharedState, game::Game},
};

/// Create a game between the caller (X) and the named opponent (O).
pub async fn start_game(
    state: &SharedState,
    actor: Uuid,
    request: StartGameRequest,
) -> Result<StartGameResponse, ServiceError> {
    let creator = user_service::resolve_actor(state, actor).await?;
    if creator.username == request.opponent_username {
        return Err(ServiceError::InvalidInput(
            "Cannot start a game with yourself.".into(),
        ));
    }

    let store = state.require_game_store().await?;
    let opponent = store
        .find_user_by_username(request.opponent_username)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Opponent not found.".into()))?;

    let game = Game::new(creator.id, opponent.id)
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    let game_id = game.id;
    store.insert_game(game.into()).await?;

    info!(%game_id, player_x = %creator.id, player_o = %opponent.id, "game started");
    Ok(StartGameResponse { game_id })
}

/// Validate and persist a move, then settle the players' records when the
/// move ends the game.
///
/// The write is conditional on the version that was read, so a concurrent
/// move on the same game surfaces as [`ServiceError::Conflict`] instead of
/// overwriting it. A finished game is persisted before the ledger runs; a
/// ledger failure leaves the game finished and is reported as
/// [`ServiceError::Ledger`].
pub async fn make_move(
    state: &SharedState,
    game_id: Uuid,
    actor: Uuid,
    request: MakeMoveRequest,
) -> Result<MoveResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let snapshot = load_game(state, game_id).await?;

    let (next, outcome) = snapshot.apply_move(
        actor,
        request.row,
        request.col,
        request.symbol,
        SystemTime::now(),
    )?;
    store.save_game(next.clone().into(), snapshot.version).await?;

    info!(
        %game_id,
        user_id = %actor,
        row = request.row,
        col = request.col,
        version = next.version,
        ?outcome,
        "move applied"
    );

    if outcome.is_terminal() {
        ledger_service::record_result(
            store.as_ref(),
            &next,
            outcome,
            state.config().ledger_backoff(),
        )
        .await?;
    }

    Ok(MoveResponse::new(&next, outcome))
}

/// Current snapshot of a game.
pub async fn get_game_state(
    state: &SharedState,
    game_id: Uuid,
) -> Result<GameStateResponse, ServiceError> {
    let game = load_game(state, game_id).await?;
    Ok(GameStateResponse::from(&game))
}

/// Replay the ledger for a finished game from its stored result.
pub async fn settle_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<SettleResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(state, game_id).await?;
    if !game.is_finished() {
        return Err(ServiceError::InvalidState(format!(
            "game `{game_id}` is still ongoing"
        )));
    }

    ledger_service::record_result(
        store.as_ref(),
        &game,
        game.outcome(),
        state.config().ledger_backoff(),
    )
    .await
    .inspect_err(|err| warn!(%game_id, error = %err, "settlement replay incomplete"))?;

    Ok(SettleResponse::new(&game))
}

async fn load_game(state: &SharedState, game_id: Uuid) -> Result<Game, ServiceError> {
    let store = state.require_game_store().await?;
    store
        .find_game(game_id)
        .await?
        .map(Game::from)
        .ok_or_else(|| ServiceError::game_not_found(game_id))
}
