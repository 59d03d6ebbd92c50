//! Game rules: move application and win/tie detection.

use crate::types::{Board, CELLS, Cell, Player};
use tracing::{instrument, trace};

/// Winning lines in scan priority order: rows, columns, `\`, `/`.
///
/// When a board satisfies two lines at once only the first one in this order
/// is reported and lowercased.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Outcome {
    /// Game continues.
    #[display("undecided")]
    Undecided,
    /// A player completed a line.
    #[display("won by {}", _0)]
    Winner(Player),
    /// Board is full and no line is complete.
    #[display("tie")]
    Tie,
}

impl Outcome {
    /// Whether the game has ended.
    pub fn is_decided(self) -> bool {
        !matches!(self, Outcome::Undecided)
    }
}

/// Returns a board with every cell holding its own label.
pub fn initialize() -> Board {
    Board::new()
}

/// Places `player`'s mark at 1-based `position`.
///
/// Succeeds only if the cell still holds its own label. Occupied cells and
/// positions outside `1..=9` leave the board untouched and return `false`.
#[instrument(level = "trace", skip(board), fields(board = %board))]
pub fn apply_move(board: &mut Board, player: Player, position: u8) -> bool {
    let Some(index) = (position as usize).checked_sub(1).filter(|&i| i < CELLS) else {
        trace!("Move out of range");
        return false;
    };
    if !board.is_empty(index) {
        trace!("Cell already occupied");
        return false;
    }
    board.set(index, Cell::Marked(player));
    true
}

/// Evaluates the board.
///
/// The first line (by [`LINES`] order) whose three cells carry the same
/// uppercase mark is lowercased in place and its player returned. `Tie` is
/// reported only when no line matches and no empty cell remains.
#[instrument(level = "trace", skip(board), fields(board = %board))]
pub fn check_result(board: &mut Board) -> Outcome {
    for line in LINES {
        let [a, b, c] = line.map(|i| board.cells()[i]);
        if let Cell::Marked(player) = a
            && a == b
            && b == c
        {
            for index in line {
                board.set(index, Cell::Winning(player));
            }
            return Outcome::Winner(player);
        }
    }

    if is_full(board) {
        Outcome::Tie
    } else {
        Outcome::Undecided
    }
}

/// Checks if no cell still holds its own label.
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|cell| *cell != Cell::Empty)
}
