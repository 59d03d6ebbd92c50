//! Board engine for the datagram tic-tac-toe server.
//!
//! Pure functions over a fixed 9-cell board. A cell is either empty
//! (labelled with its own 1-based position), marked by a player, or marked
//! and part of a detected winning line. There is no I/O here and no state
//! beyond the board buffer itself.
//!
//! ```
//! use ttt_board::{apply_move, check_result, initialize, Outcome, Player};
//!
//! let mut board = initialize();
//! assert!(apply_move(&mut board, Player::X, 5));
//! assert!(!apply_move(&mut board, Player::O, 5));
//! assert_eq!(check_result(&mut board), Outcome::Undecided);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod rules;
mod types;

pub use error::BoardError;
pub use rules::{LINES, Outcome, apply_move, check_result, initialize, is_full};
pub use types::{Board, CELLS, Cell, Player};
