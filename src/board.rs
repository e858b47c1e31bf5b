//! Board representation and rules for NxN tic-tac-toe.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Smallest playable board.
pub const MIN_SIZE: usize = 3;
/// Largest playable board.
pub const MAX_SIZE: usize = 10;

/// Player mark placed on the board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Mark {
    /// Mark X (always moves first).
    X,
    /// Mark O.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A single cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// No mark placed yet.
    Empty,
    /// Cell claimed by a mark.
    Occupied(Mark),
}

/// Errors from board construction and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Requested size is outside the supported range.
    #[display("invalid board size {size}: must be between 3 and 10")]
    InvalidSize {
        /// The rejected size.
        size: usize,
    },
    /// Target cell is out of range or already occupied.
    #[display("invalid move at ({row}, {col}): out of range or already occupied")]
    InvalidMove {
        /// Row of the rejected move.
        row: usize,
        /// Column of the rejected move.
        col: usize,
    },
}

/// NxN grid of cells, row-major.
///
/// Cells are only ever written through [`Board::place`], which refuses to
/// overwrite, so every non-empty cell corresponds to exactly one accepted
/// move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidSize`] unless `MIN_SIZE <= size <= MAX_SIZE`.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::InvalidSize { size });
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
        })
    }

    /// Returns the board dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the cell at the given coordinates, `None` if out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    /// True iff both coordinates are in range and the cell is empty.
    ///
    /// Out-of-range coordinates are not an error, they simply yield `false`,
    /// so callers can probe before acting.
    pub fn is_valid_move(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(Cell::Empty)
    }

    /// Places a mark at the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidMove`] if the target is out of range or
    /// already occupied. The board is unchanged on error.
    pub fn place(&mut self, row: usize, col: usize, mark: Mark) -> Result<(), BoardError> {
        if !self.is_valid_move(row, col) {
            return Err(BoardError::InvalidMove { row, col });
        }
        self.cells[row * self.size + col] = Cell::Occupied(mark);
        Ok(())
    }

    /// True iff no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    /// True iff any full row, any full column, the main diagonal or the
    /// anti-diagonal consists entirely of `mark`.
    ///
    /// Lines are checked rows, then columns, then diagonals; the first hit
    /// short-circuits. The result does not depend on that order.
    pub fn check_win(&self, mark: Mark) -> bool {
        self.any_row(mark)
            || self.any_column(mark)
            || self.diagonal(mark)
            || self.anti_diagonal(mark)
    }

    /// All coordinates where [`Board::is_valid_move`] holds, row-major.
    pub fn open_cells(&self) -> Vec<(usize, usize)> {
        (0..self.size)
            .flat_map(|row| (0..self.size).map(move |col| (row, col)))
            .filter(|&(row, col)| self.is_valid_move(row, col))
            .collect()
    }

    fn holds(&self, row: usize, col: usize, mark: Mark) -> bool {
        self.get(row, col) == Some(Cell::Occupied(mark))
    }

    fn any_row(&self, mark: Mark) -> bool {
        (0..self.size).any(|row| (0..self.size).all(|col| self.holds(row, col, mark)))
    }

    fn any_column(&self, mark: Mark) -> bool {
        (0..self.size).any(|col| (0..self.size).all(|row| self.holds(row, col, mark)))
    }

    fn diagonal(&self, mark: Mark) -> bool {
        (0..self.size).all(|i| self.holds(i, i, mark))
    }

    fn anti_diagonal(&self, mark: Mark) -> bool {
        (0..self.size).all(|i| self.holds(i, self.size - 1 - i, mark))
    }
}
