//! Lifecycle of a single game: seat assignment, move validation, and the
//! ongoing → finished transition.

use std::time::SystemTime;

use thiserror::Error;
use uuid::Uuid;

use crate::state::board::{Board, BoardError, Symbol};

/// High-level status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Moves are accepted from the player whose turn it is.
    Ongoing,
    /// Terminal; no further moves are accepted.
    Finished,
}

/// Final result, present only once the game is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    /// A player completed a line.
    Win {
        /// Player who completed the line.
        winner: Uuid,
        /// Symbol on the completed line.
        symbol: Symbol,
    },
    /// Board filled without any complete line.
    Draw,
}

/// Immutable record of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    /// Zero-based row.
    pub row: u8,
    /// Zero-based column.
    pub col: u8,
    /// Symbol placed.
    pub symbol: Symbol,
    /// Player who placed it.
    pub actor: Uuid,
    /// When the move was accepted.
    pub played_at: SystemTime,
}

/// Tag returned with each accepted move so callers know whether to settle the
/// players' records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Game still running; the turn passed to the other seat.
    Continued,
    /// The move completed a line.
    Won {
        /// Winning symbol.
        symbol: Symbol,
        /// Player who played the winning move.
        actor: Uuid,
    },
    /// The move filled the board without completing a line.
    Drawn,
}

impl MoveOutcome {
    /// Whether the move ended the game.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MoveOutcome::Continued)
    }
}

/// Reasons a move is rejected, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The game is already won or drawn.
    #[error("game already finished")]
    GameFinished,
    /// The caller holds neither seat.
    #[error("you are not a player in this game")]
    NotAParticipant,
    /// The caller asked for the other seat's symbol.
    #[error("you are not allowed to play as {requested} (your seat plays {expected})")]
    WrongSymbol {
        /// Symbol of the caller's seat.
        expected: Symbol,
        /// Symbol in the request.
        requested: Symbol,
    },
    /// It is the other player's turn.
    #[error("not your turn")]
    NotYourTurn,
    /// Row or column outside `0..=2`.
    #[error("move ({row}, {col}) is out of bounds")]
    OutOfBounds {
        /// Requested row.
        row: i64,
        /// Requested column.
        col: i64,
    },
    /// The cell already holds a symbol.
    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
    },
}

impl From<BoardError> for MoveError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::OutOfBounds { row, col } => MoveError::OutOfBounds { row, col },
            BoardError::CellOccupied { row, col } => MoveError::CellOccupied { row, col },
        }
    }
}

/// A game cannot be created against oneself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot start a game with yourself")]
pub struct SelfPlay;

/// Aggregate owning a board and its move history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Game identifier.
    pub id: Uuid,
    /// Creator, seated on X.
    pub player_x: Uuid,
    /// Opponent, seated on O.
    pub player_o: Uuid,
    /// Current grid.
    pub board: Board,
    /// Accepted moves, oldest first.
    pub moves: Vec<Move>,
    /// Lifecycle state.
    pub status: GameStatus,
    /// Player expected to move next; only meaningful while ongoing.
    pub current_turn: Uuid,
    /// Set when the game finishes.
    pub result: Option<GameResult>,
    /// When the game was started.
    pub created_at: SystemTime,
    /// When the last move was accepted.
    pub updated_at: SystemTime,
    /// Incremented on every accepted move; used for conditional writes.
    pub version: u64,
}

impl Game {
    /// Start a fresh game. `player_x` moves first.
    pub fn new(player_x: Uuid, player_o: Uuid) -> Result<Self, SelfPlay> {
        if player_x == player_o {
            return Err(SelfPlay);
        }

        let now = SystemTime::now();
        Ok(Self {
            id: Uuid::new_v4(),
            player_x,
            player_o,
            board: Board::new(),
            moves: Vec::new(),
            status: GameStatus::Ongoing,
            current_turn: player_x,
            result: None,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Symbol bound to `player`, if they hold a seat.
    pub fn seat(&self, player: Uuid) -> Option<Symbol> {
        if player == self.player_x {
            Some(Symbol::X)
        } else if player == self.player_o {
            Some(Symbol::O)
        } else {
            None
        }
    }

    /// Player seated on `symbol`.
    pub fn player_for(&self, symbol: Symbol) -> Uuid {
        match symbol {
            Symbol::X => self.player_x,
            Symbol::O => self.player_o,
        }
    }

    /// The other participant, if `player` holds a seat.
    pub fn opponent_of(&self, player: Uuid) -> Option<Uuid> {
        self.seat(player)
            .map(|symbol| self.player_for(symbol.opponent()))
    }

    /// Whether the game has been won or drawn.
    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    /// Outcome implied by the stored result, used to settle a finished game
    /// again after a failed ledger update.
    pub fn outcome(&self) -> MoveOutcome {
        match self.result {
            Some(GameResult::Win { winner, symbol }) => MoveOutcome::Won {
                symbol,
                actor: winner,
            },
            Some(GameResult::Draw) => MoveOutcome::Drawn,
            None => MoveOutcome::Continued,
        }
    }

    /// Validate and apply a move, returning the next snapshot.
    ///
    /// `self` is left untouched; on error nothing changes. Checks run in a
    /// fixed order and the first failure is reported: status, participation,
    /// seat symbol, turn, then board geometry.
    pub fn apply_move(
        &self,
        actor: Uuid,
        row: i64,
        col: i64,
        symbol: Symbol,
        played_at: SystemTime,
    ) -> Result<(Game, MoveOutcome), MoveError> {
        if self.is_finished() {
            return Err(MoveError::GameFinished);
        }

        let expected = self.seat(actor).ok_or(MoveError::NotAParticipant)?;
        if expected != symbol {
            return Err(MoveError::WrongSymbol {
                expected,
                requested: symbol,
            });
        }

        if actor != self.current_turn {
            return Err(MoveError::NotYourTurn);
        }

        let board = self.board.place(row, col, symbol)?;

        let mut next = self.clone();
        next.board = board;
        next.moves.push(Move {
            // place() has bounded both coordinates to 0..3
            row: row as u8,
            col: col as u8,
            symbol,
            actor,
            played_at,
        });
        next.updated_at = played_at;
        next.version = self.version + 1;

        let outcome = match board.detect_winner() {
            Some(_) => {
                next.status = GameStatus::Finished;
                next.result = Some(GameResult::Win {
                    winner: actor,
                    symbol,
                });
                MoveOutcome::Won { symbol, actor }
            }
            None if board.is_full() => {
                next.status = GameStatus::Finished;
                next.result = Some(GameResult::Draw);
                MoveOutcome::Drawn
            }
            None => {
                next.current_turn = self.player_for(symbol.opponent());
                MoveOutcome::Continued
            }
        };

        Ok((next, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> (Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4())
    }

    fn play(game: &Game, actor: Uuid, row: i64, col: i64, symbol: Symbol) -> (Game, MoveOutcome) {
        game.apply_move(actor, row, col, symbol, SystemTime::now())
            .unwrap()
    }

    #[test]
    fn new_game_starts_ongoing_with_x_to_move() {
        let (a, b) = players();
        let game = Game::new(a, b).unwrap();

        assert_eq!(game.status, GameStatus::Ongoing);
        assert_eq!(game.current_turn, a);
        assert_eq!(game.result, None);
        assert!(game.moves.is_empty());
        assert_eq!(game.version, 0);
    }

    #[test]
    fn cannot_play_against_yourself() {
        let a = Uuid::new_v4();
        assert_eq!(Game::new(a, a), Err(SelfPlay));
    }

    #[test]
    fn top_row_win_scenario() {
        let (a, b) = players();
        let game = Game::new(a, b).unwrap();

        let (game, outcome) = play(&game, a, 0, 0, Symbol::X);
        assert_eq!(outcome, MoveOutcome::Continued);
        assert_eq!(game.current_turn, b);
        let (game, _) = play(&game, b, 1, 1, Symbol::O);
        assert_eq!(game.current_turn, a);
        let (game, _) = play(&game, a, 0, 1, Symbol::X);
        assert_eq!(game.current_turn, b);
        let (game, _) = play(&game, b, 2, 2, Symbol::O);
        assert_eq!(game.current_turn, a);
        assert_eq!(game.status, GameStatus::Ongoing);

        let (game, outcome) = play(&game, a, 0, 2, Symbol::X);
        assert_eq!(
            outcome,
            MoveOutcome::Won {
                symbol: Symbol::X,
                actor: a
            }
        );
        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(
            game.result,
            Some(GameResult::Win {
                winner: a,
                symbol: Symbol::X
            })
        );
        assert_eq!(game.moves.len(), 5);
        assert_eq!(game.version, 5);
        assert_eq!(game.outcome(), outcome);
    }

    #[test]
    fn nine_moves_without_a_line_is_a_draw() {
        let (a, b) = players();
        let mut game = Game::new(a, b).unwrap();
        // X O X
        // X O O
        // O X X
        let script = [
            (a, 0, 0, Symbol::X),
            (b, 0, 1, Symbol::O),
            (a, 0, 2, Symbol::X),
            (b, 1, 1, Symbol::O),
            (a, 1, 0, Symbol::X),
            (b, 1, 2, Symbol::O),
            (a, 2, 1, Symbol::X),
            (b, 2, 0, Symbol::O),
        ];
        for (actor, row, col, symbol) in script {
            let (next, outcome) = play(&game, actor, row, col, symbol);
            assert_eq!(outcome, MoveOutcome::Continued);
            game = next;
        }

        let (game, outcome) = play(&game, a, 2, 2, Symbol::X);
        assert_eq!(outcome, MoveOutcome::Drawn);
        assert_eq!(game.status, GameStatus::Finished);
        assert_eq!(game.result, Some(GameResult::Draw));
        assert!(game.board.is_full());
    }

    #[test]
    fn out_of_turn_move_is_rejected_without_changes() {
        let (a, b) = players();
        let game = Game::new(a, b).unwrap();

        let err = game
            .apply_move(b, 1, 1, Symbol::O, SystemTime::now())
            .unwrap_err();
        assert_eq!(err, MoveError::NotYourTurn);
        assert_eq!(game.board, Board::new());
        assert_eq!(game.status, GameStatus::Ongoing);
        assert_eq!(game.current_turn, a);
    }

    #[test]
    fn turn_always_flips_to_the_other_seat() {
        let (a, b) = players();
        let mut game = Game::new(a, b).unwrap();
        let cells = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1)];

        for (row, col) in cells {
            let mover = game.current_turn;
            let symbol = game.seat(mover).unwrap();
            let (next, outcome) = play(&game, mover, row, col, symbol);
            assert_eq!(outcome, MoveOutcome::Continued);
            assert_ne!(next.current_turn, mover);
            assert!(next.current_turn == a || next.current_turn == b);
            game = next;
        }
    }

    #[test]
    fn finished_game_rejects_before_geometry_checks() {
        let (a, b) = players();
        let mut game = Game::new(a, b).unwrap();
        for (actor, row, col, symbol) in [
            (a, 0, 0, Symbol::X),
            (b, 1, 0, Symbol::O),
            (a, 0, 1, Symbol::X),
            (b, 1, 1, Symbol::O),
            (a, 0, 2, Symbol::X),
        ] {
            game = play(&game, actor, row, col, symbol).0;
        }
        assert!(game.is_finished());

        let now = SystemTime::now();
        assert_eq!(
            game.apply_move(b, 7, -3, Symbol::O, now),
            Err(MoveError::GameFinished)
        );
        assert_eq!(
            game.apply_move(Uuid::new_v4(), 0, 0, Symbol::X, now),
            Err(MoveError::GameFinished)
        );
    }

    #[test]
    fn checks_run_in_order() {
        let (a, b) = players();
        let game = Game::new(a, b).unwrap();
        let now = SystemTime::now();

        assert_eq!(
            game.apply_move(Uuid::new_v4(), 9, 9, Symbol::X, now),
            Err(MoveError::NotAParticipant)
        );
        // Wrong symbol wins over wrong turn.
        assert_eq!(
            game.apply_move(b, 0, 0, Symbol::X, now),
            Err(MoveError::WrongSymbol {
                expected: Symbol::O,
                requested: Symbol::X
            })
        );
        // Wrong turn wins over bad coordinates.
        assert_eq!(
            game.apply_move(b, 5, 5, Symbol::O, now),
            Err(MoveError::NotYourTurn)
        );
        assert_eq!(
            game.apply_move(a, 3, 0, Symbol::X, now),
            Err(MoveError::OutOfBounds { row: 3, col: 0 })
        );

        let (game, _) = play(&game, a, 0, 0, Symbol::X);
        assert_eq!(
            game.apply_move(b, 0, 0, Symbol::O, now),
            Err(MoveError::CellOccupied { row: 0, col: 0 })
        );
    }

    #[test]
    fn seats_and_opponents() {
        let (a, b) = players();
        let game = Game::new(a, b).unwrap();

        assert_eq!(game.seat(a), Some(Symbol::X));
        assert_eq!(game.seat(b), Some(Symbol::O));
        assert_eq!(game.seat(Uuid::new_v4()), None);
        assert_eq!(game.player_for(Symbol::O), b);
        assert_eq!(game.opponent_of(a), Some(b));
        assert_eq!(game.opponent_of(b), Some(a));
        assert_eq!(game.outcome(), MoveOutcome::Continued);
    }
}
