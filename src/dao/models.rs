use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::{
    board::{Board, Cell, Symbol},
    game::{Game, GameResult, GameStatus, Move},
};

/// Registered player and their outcome sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Stable identifier for the user.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Stored as provided; credential handling lives outside this service.
    pub password: String,
    /// Games won, in the order they were recorded.
    #[serde(default)]
    pub wins: IndexSet<Uuid>,
    /// Games lost.
    #[serde(default)]
    pub losses: IndexSet<Uuid>,
    /// Games drawn.
    #[serde(default)]
    pub draws: IndexSet<Uuid>,
    /// Registration timestamp.
    pub created_at: SystemTime,
}

impl UserEntity {
    /// Fresh user with empty outcome sets.
    pub fn new(username: String, password: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password,
            wins: IndexSet::new(),
            losses: IndexSet::new(),
            draws: IndexSet::new(),
            created_at: SystemTime::now(),
        }
    }

    /// Outcome already recorded for `game_id`, if any.
    pub fn recorded_outcome(&self, game_id: Uuid) -> Option<OutcomeKind> {
        if self.wins.contains(&game_id) {
            Some(OutcomeKind::Win)
        } else if self.losses.contains(&game_id) {
            Some(OutcomeKind::Loss)
        } else if self.draws.contains(&game_id) {
            Some(OutcomeKind::Draw)
        } else {
            None
        }
    }

    /// Record `game_id` under `kind` unless the game is already present in any
    /// outcome set. Returns whether the user changed.
    pub fn record_outcome(&mut self, game_id: Uuid, kind: OutcomeKind) -> bool {
        if self.recorded_outcome(game_id).is_some() {
            return false;
        }
        match kind {
            OutcomeKind::Win => self.wins.insert(game_id),
            OutcomeKind::Loss => self.losses.insert(game_id),
            OutcomeKind::Draw => self.draws.insert(game_id),
        }
    }
}

/// Which outcome set a game id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The user won the game.
    Win,
    /// The user lost the game.
    Loss,
    /// The game ended without a winner.
    Draw,
}

impl OutcomeKind {
    /// Name of the user field holding this outcome set.
    pub fn field(self) -> &'static str {
        match self {
            OutcomeKind::Win => "wins",
            OutcomeKind::Loss => "losses",
            OutcomeKind::Draw => "draws",
        }
    }
}

/// Persisted lifecycle flag of a game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatusEntity {
    /// Moves are still accepted.
    Ongoing,
    /// Won or drawn; the game is frozen.
    Finished,
}

/// Persisted result; `None` on the game while ongoing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameResultEntity {
    /// Three in a row.
    Win {
        /// Player seated on the winning symbol.
        winner: Uuid,
        /// Symbol that completed the line.
        symbol: Symbol,
    },
    /// Full board without a line.
    Draw,
}

/// Accepted move as stored alongside its game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveEntity {
    /// Zero-based row.
    pub row: u8,
    /// Zero-based column.
    pub col: u8,
    /// Symbol placed.
    pub symbol: Symbol,
    /// Player who placed it.
    pub user_id: Uuid,
    /// When the move was accepted.
    pub played_at: SystemTime,
}

/// Aggregate game entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Player seated on X (the game creator).
    pub player_x: Uuid,
    /// Player seated on O.
    pub player_o: Uuid,
    /// Row-major grid.
    pub board: [[Cell; 3]; 3],
    /// Moves in the order they were accepted.
    pub moves: Vec<MoveEntity>,
    /// Lifecycle flag.
    pub status: GameStatusEntity,
    /// Player expected to move next; frozen once finished.
    pub current_turn: Uuid,
    /// Final result, set exactly when `status` is finished.
    pub result: Option<GameResultEntity>,
    /// Creation timestamp, used to order a player's history.
    pub created_at: SystemTime,
    /// Last time a move was accepted.
    pub updated_at: SystemTime,
    /// Optimistic concurrency token.
    pub version: u64,
}

impl From<Move> for MoveEntity {
    fn from(value: Move) -> Self {
        Self {
            row: value.row,
            col: value.col,
            symbol: value.symbol,
            user_id: value.actor,
            played_at: value.played_at,
        }
    }
}

impl From<MoveEntity> for Move {
    fn from(value: MoveEntity) -> Self {
        Self {
            row: value.row,
            col: value.col,
            symbol: value.symbol,
            actor: value.user_id,
            played_at: value.played_at,
        }
    }
}

impl From<Game> for GameEntity {
    fn from(game: Game) -> Self {
        Self {
            id: game.id,
            player_x: game.player_x,
            player_o: game.player_o,
            board: *game.board.cells(),
            moves: game.moves.into_iter().map(Into::into).collect(),
            status: match game.status {
                GameStatus::Ongoing => GameStatusEntity::Ongoing,
                GameStatus::Finished => GameStatusEntity::Finished,
            },
            current_turn: game.current_turn,
            result: game.result.map(|result| match result {
                GameResult::Win { winner, symbol } => GameResultEntity::Win { winner, symbol },
                GameResult::Draw => GameResultEntity::Draw,
            }),
            created_at: game.created_at,
            updated_at: game.updated_at,
            version: game.version,
        }
    }
}

impl From<GameEntity> for Game {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            player_x: entity.player_x,
            player_o: entity.player_o,
            board: Board::from_cells(entity.board),
            moves: entity.moves.into_iter().map(Into::into).collect(),
            status: match entity.status {
                GameStatusEntity::Ongoing => GameStatus::Ongoing,
                GameStatusEntity::Finished => GameStatus::Finished,
            },
            current_turn: entity.current_turn,
            result: entity.result.map(|result| match result {
                GameResultEntity::Win { winner, symbol } => GameResult::Win { winner, symbol },
                GameResultEntity::Draw => GameResult::Draw,
            }),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            version: entity.version,
        }
    }
}
