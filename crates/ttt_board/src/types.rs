//! Core domain types for the board engine.

use crate::error::BoardError;
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

/// Number of cells on the board.
pub const CELLS: usize = 9;

/// Player in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Player {
    /// Player 1, the server. Marks with `X` and opens every game.
    X,
    /// Player 2, the remote client. Marks with `O`.
    O,
}

impl Player {
    /// Protocol player number: 1 for `X`, 2 for `O`.
    pub fn number(self) -> u8 {
        match self {
            Player::X => 1,
            Player::O => 2,
        }
    }

    /// Uppercase mark placed by a move.
    pub fn mark(self) -> u8 {
        match self {
            Player::X => b'X',
            Player::O => b'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {} ({})", self.number(), self.mark() as char)
    }
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Empty; rendered as the cell's own 1-based position.
    Empty,
    /// Occupied by a player.
    Marked(Player),
    /// Occupied and part of the detected winning line (lowercase mark).
    Winning(Player),
}

impl Cell {
    /// Byte form of the cell at 0-based `index`.
    pub fn to_byte(self, index: usize) -> u8 {
        match self {
            Cell::Empty => b'1' + index as u8,
            Cell::Marked(player) => player.mark(),
            Cell::Winning(player) => player.mark().to_ascii_lowercase(),
        }
    }

    /// Parses the cell at 0-based `index` from its byte form.
    pub fn from_byte(index: usize, byte: u8) -> Result<Self, BoardError> {
        match byte {
            b'X' => Ok(Cell::Marked(Player::X)),
            b'O' => Ok(Cell::Marked(Player::O)),
            b'x' => Ok(Cell::Winning(Player::X)),
            b'o' => Ok(Cell::Winning(Player::O)),
            b if b == b'1' + index as u8 => Ok(Cell::Empty),
            byte => Err(BoardError::InvalidCell {
                position: index + 1,
                byte,
            }),
        }
    }

    /// The player occupying this cell, winning or not.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Marked(player) | Cell::Winning(player) => Some(player),
        }
    }
}

/// 3x3 board, cells in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; CELLS],
}

impl Board {
    /// Creates a board with every cell holding its own label.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELLS],
        }
    }

    /// Gets the cell at a 0-based index.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub(crate) fn set(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }

    /// Checks if the cell at a 0-based index is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.cells
    }

    /// 1-based moves that are still playable.
    pub fn empty_positions(&self) -> Vec<u8> {
        (0..CELLS)
            .filter(|&index| self.is_empty(index))
            .map(|index| index as u8 + 1)
            .collect()
    }

    /// Number of cells occupied by `player`, winning or not.
    pub fn count(&self, player: Player) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.player() == Some(player))
            .count()
    }

    /// Whether any cell belongs to a detected winning line.
    pub fn has_winning_line(&self) -> bool {
        self.cells.iter().any(|c| matches!(c, Cell::Winning(_)))
    }

    /// Wire form: the nine cell bytes.
    pub fn to_bytes(&self) -> [u8; CELLS] {
        let mut bytes = [0u8; CELLS];
        for (index, cell) in self.cells.iter().enumerate() {
            bytes[index] = cell.to_byte(index);
        }
        bytes
    }

    /// Parses the wire form, rejecting any byte that is not a valid cell
    /// for its position.
    #[instrument(level = "trace")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BoardError> {
        if bytes.len() != CELLS {
            return Err(BoardError::Length(bytes.len()));
        }
        let mut board = Board::new();
        for (index, &byte) in bytes.iter().enumerate() {
            board.cells[index] = Cell::from_byte(index, byte)?;
        }
        Ok(board)
    }

    /// Multi-line grid used by presenters.
    ///
    /// ```text
    ///  X | 2 | 3
    /// ---+---+---
    ///  4 | O | 6
    /// ---+---+---
    ///  7 | 8 | 9
    /// ```
    pub fn grid(&self) -> String {
        let bytes = self.to_bytes();
        let mut result = String::new();
        for row in 0..3 {
            let cells: Vec<String> = (0..3)
                .map(|col| format!(" {} ", bytes[row * 3 + col] as char))
                .collect();
            result.push_str(&cells.join("|"));
            if row < 2 {
                result.push_str("\n---+---+---\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_bytes() {
            write!(f, "{}", byte as char)?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_bytes(s.as_bytes())
    }
}
