use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_username},
    state::{
        board::{Board, Symbol},
        game::{Game, GameResult, GameStatus, Move, MoveOutcome},
    },
};

/// Payload for `/games/start`; the caller always plays X.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartGameRequest {
    /// Registered user who will play O.
    #[validate(custom(function = "validate_username"))]
    pub opponent_username: String,
}

/// Identifier of a freshly created game.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartGameResponse {
    /// Id to use in the `/games/{id}` routes.
    pub game_id: Uuid,
}

/// A move attempt. Coordinates are signed so that out-of-range values reach
/// the game rules instead of failing deserialization.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MakeMoveRequest {
    /// Zero-based row, `0..=2`.
    pub row: i64,
    /// Zero-based column, `0..=2`.
    pub col: i64,
    /// Must match the caller's seat.
    pub symbol: Symbol,
}

/// Lifecycle state as exposed over HTTP.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatusDto {
    /// Waiting for `current_turn` to move.
    Ongoing,
    /// Won or drawn.
    Finished,
}

impl From<GameStatus> for GameStatusDto {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Ongoing => GameStatusDto::Ongoing,
            GameStatus::Finished => GameStatusDto::Finished,
        }
    }
}

/// What an accepted move did to the game.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveOutcomeDto {
    /// The turn passed to the other player.
    Continued,
    /// The move completed a line.
    Won {
        /// Symbol on the completed line.
        symbol: Symbol,
        /// Player seated on that symbol.
        winner: Uuid,
    },
    /// The move filled the board.
    Drawn,
}

impl MoveOutcomeDto {
    fn new(game: &Game, outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Continued => MoveOutcomeDto::Continued,
            MoveOutcome::Won { symbol, .. } => MoveOutcomeDto::Won {
                symbol,
                winner: game.player_for(symbol),
            },
            MoveOutcome::Drawn => MoveOutcomeDto::Drawn,
        }
    }
}

/// Response to an accepted move.
#[derive(Debug, Serialize, ToSchema)]
pub struct MoveResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Game state after the move.
    pub status: GameStatusDto,
    /// Effect of the move.
    pub outcome: MoveOutcomeDto,
    /// Next player to move; unchanged once finished.
    pub current_turn: Uuid,
    /// Version after the move.
    pub version: u64,
}

impl MoveResponse {
    /// Response for the move that produced `game`.
    pub fn new(game: &Game, outcome: MoveOutcome) -> Self {
        Self {
            message: "Move successful.".into(),
            status: game.status.into(),
            outcome: MoveOutcomeDto::new(game, outcome),
            current_turn: game.current_turn,
            version: game.version,
        }
    }
}

/// One accepted move in a game snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct MoveSummary {
    /// Zero-based row.
    pub row: u8,
    /// Zero-based column.
    pub col: u8,
    /// Symbol placed.
    pub symbol: Symbol,
    /// Player who placed it.
    pub user_id: Uuid,
    /// RFC 3339 timestamp.
    pub played_at: String,
}

impl From<&Move> for MoveSummary {
    fn from(mv: &Move) -> Self {
        Self {
            row: mv.row,
            col: mv.col,
            symbol: mv.symbol,
            user_id: mv.actor,
            played_at: format_system_time(mv.played_at),
        }
    }
}

/// Full snapshot of a game. Empty cells are rendered as `""`.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameStateResponse {
    /// Game identifier.
    pub game_id: Uuid,
    /// Player on X.
    pub player_x: Uuid,
    /// Player on O.
    pub player_o: Uuid,
    /// Rows of `"X"`, `"O"` or `""`.
    pub board: Vec<Vec<String>>,
    /// Next player to move.
    pub current_turn: Uuid,
    /// Lifecycle state.
    pub status: GameStatusDto,
    /// Set when the game was won.
    pub winner: Option<Uuid>,
    /// True when the game ended in a draw.
    pub draw: bool,
    /// Accepted moves, oldest first.
    pub moves: Vec<MoveSummary>,
    /// Optimistic concurrency token.
    pub version: u64,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 time of the last move.
    pub updated_at: String,
}

fn render_board(board: &Board) -> Vec<Vec<String>> {
    board
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.map(|symbol| symbol.to_string()).unwrap_or_default())
                .collect()
        })
        .collect()
}

impl From<&Game> for GameStateResponse {
    fn from(game: &Game) -> Self {
        let (winner, draw) = match game.result {
            Some(GameResult::Win { winner, .. }) => (Some(winner), false),
            Some(GameResult::Draw) => (None, true),
            None => (None, false),
        };
        Self {
            game_id: game.id,
            player_x: game.player_x,
            player_o: game.player_o,
            board: render_board(&game.board),
            current_turn: game.current_turn,
            status: game.status.into(),
            winner,
            draw,
            moves: game.moves.iter().map(MoveSummary::from).collect(),
            version: game.version,
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
        }
    }
}

/// Response to a settlement replay.
#[derive(Debug, Serialize, ToSchema)]
pub struct SettleResponse {
    /// The settled game.
    pub game_id: Uuid,
    /// Result recorded on both players.
    pub outcome: MoveOutcomeDto,
}

impl SettleResponse {
    /// Response for the finished `game`.
    pub fn new(game: &Game) -> Self {
        Self {
            game_id: game.id,
            outcome: MoveOutcomeDto::new(game, game.outcome()),
        }
    }
}
