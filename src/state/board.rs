//! 3x3 tic-tac-toe grid with pure placement and win/draw detection.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Side of the board is fixed to three cells.
pub const BOARD_SIZE: usize = 3;

/// Mark a player writes on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Symbol {
    /// Always played by the player who created the game.
    X,
    /// Played by the invited opponent.
    O,
}

impl Symbol {
    /// Symbol of the other seat.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::X => f.write_str("X"),
            Symbol::O => f.write_str("O"),
        }
    }
}

/// State of a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing played here yet.
    #[default]
    Empty,
    /// Occupied by X.
    X,
    /// Occupied by O.
    O,
}

impl Cell {
    /// Symbol occupying the cell, if any.
    pub fn symbol(self) -> Option<Symbol> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Symbol::X),
            Cell::O => Some(Symbol::O),
        }
    }
}

impl From<Symbol> for Cell {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => Cell::X,
            Symbol::O => Cell::O,
        }
    }
}

/// Reasons a placement is rejected by the board itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Row or column outside the grid.
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

/// Row-major 3x3 grid. Cells only ever go from `Empty` to a symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a board from persisted rows.
    pub fn from_cells(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// Cell at `(row, col)`, `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|cells| cells.get(col)).copied()
    }

    /// Borrow the raw rows.
    pub fn cells(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Rows projected to symbols, convenient for rendering.
    pub fn rows(&self) -> [[Option<Symbol>; BOARD_SIZE]; BOARD_SIZE] {
        self.cells.map(|row| row.map(Cell::symbol))
    }

    /// Return a copy of the board with `symbol` written at `(row, col)`.
    ///
    /// Coordinates are signed so that any client-supplied value can be
    /// checked here rather than rejected earlier by a lossy conversion.
    pub fn place(&self, row: i64, col: i64, symbol: Symbol) -> Result<Board, BoardError> {
        let (r, c) = match (usize::try_from(row), usize::try_from(col)) {
            (Ok(r), Ok(c)) if r < BOARD_SIZE && c < BOARD_SIZE => (r, c),
            _ => return Err(BoardError::OutOfBounds { row, col }),
        };

        if self.cells[r][c] != Cell::Empty {
            return Err(BoardError::CellOccupied { row: r, col: c });
        }

        let mut next = *self;
        next.cells[r][c] = symbol.into();
        Ok(next)
    }

    /// Symbol owning a complete line.
    ///
    /// Lines are scanned rows first, then columns, then the main diagonal and
    /// finally the anti-diagonal; the first complete line found wins.
    pub fn detect_winner(&self) -> Option<Symbol> {
        LINES.iter().find_map(|[a, b, c]| {
            let first = self.cells[a.0][a.1];
            (first != Cell::Empty
                && first == self.cells[b.0][b.1]
                && first == self.cells[c.0][c.1])
                .then(|| first.symbol())
                .flatten()
        })
    }

    /// True once no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|cell| *cell != Cell::Empty)
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Cell::Empty)
            .count()
    }
}

const LINES: [[(usize, usize); 3]; 8] = [
    // rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];
