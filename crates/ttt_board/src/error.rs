//! Board conversion errors.

/// Error produced when a board cannot be built from external input.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// The input does not hold exactly nine cells.
    #[display("Board must have 9 cells, got {}", _0)]
    Length(usize),

    /// A byte is neither the cell's own label nor a player mark.
    #[display("Invalid cell {:?} at position {}", *byte as char, position)]
    InvalidCell {
        /// 1-based position of the offending cell.
        position: usize,
        /// The raw byte found there.
        byte: u8,
    },
}

impl std::error::Error for BoardError {}
