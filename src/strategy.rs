//! Move generation for the server's side of the board.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};
use ttt_board::Board;

/// Picks the server's next move.
pub trait MoveStrategy: Send {
    /// Returns a 1-based empty cell, or `None` when the board is full.
    fn choose(&mut self, board: &Board) -> Option<u8>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// Uniformly random choice among the empty cells.
#[derive(Debug)]
pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    /// Creates a strategy seeded from `seed`, or from OS entropy when `None`.
    #[instrument]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl MoveStrategy for RandomStrategy {
    fn choose(&mut self, board: &Board) -> Option<u8> {
        let choice = board.empty_positions().choose(&mut self.rng).copied();
        debug!(?choice, "Random move");
        choice
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Picks the first empty cell. Deterministic; used for scripted games.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstAvailable;

impl MoveStrategy for FirstAvailable {
    fn choose(&mut self, board: &Board) -> Option<u8> {
        board.empty_positions().first().copied()
    }

    fn name(&self) -> &str {
        "first-available"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_picks_only_empty_cells() {
        let board: Board = "XO3OX6X8O".parse().unwrap();
        let mut strategy = RandomStrategy::new(Some(7));
        for _ in 0..50 {
            let choice = strategy.choose(&board).unwrap();
            assert!([3, 6, 8].contains(&choice));
        }
    }

    #[test]
    fn test_seeded_random_is_repeatable() {
        let board = Board::new();
        let mut a = RandomStrategy::new(Some(42));
        let mut b = RandomStrategy::new(Some(42));
        for _ in 0..10 {
            assert_eq!(a.choose(&board), b.choose(&board));
        }
    }

    #[test]
    fn test_full_board_has_no_move() {
        let board: Board = "XOXXOOOXX".parse().unwrap();
        assert_eq!(RandomStrategy::new(None).choose(&board), None);
        assert_eq!(FirstAvailable.choose(&board), None);
    }

    #[test]
    fn test_first_available() {
        let board: Board = "XO3456789".parse().unwrap();
        assert_eq!(FirstAvailable.choose(&board), Some(3));
    }
}
