use thiserror::Error;

use crate::domain::BOARD_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("coordinate ({row}, {col}) is outside the {size}x{size} board", size = BOARD_SIZE)]
    CoordinateOutOfRange { row: i64, col: i64 },
    #[error("board must have {expected} rows, got {actual}")]
    BoardRowCount { expected: usize, actual: usize },
    #[error("board row {row} must have {expected} cells, got {actual}")]
    BoardRowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown side token {0:?}")]
    UnknownSide(String),
    #[error("unknown winner token {0:?}")]
    UnknownWinner(String),
}
