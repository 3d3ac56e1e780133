//! World-level errors.

use thiserror::Error;

use crate::coords::MatrixPos;

/// Why a block could not be placed. These are expected, silent rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("cell {0} is outside the block matrix")]
    OutOfBounds(MatrixPos),

    #[error("cell {0} is already occupied")]
    Occupied(MatrixPos),

    #[error("cell {0} has no occupied neighbor")]
    Unsupported(MatrixPos),
}

/// A disagreement between the block matrix and the block index.
///
/// Any of these means a logic defect in the grid, never a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyFault {
    #[error("matrix and index disagree at {pos}: matrix occupied = {matrix}, indexed = {indexed}")]
    IndexMismatch {
        pos: MatrixPos,
        matrix: bool,
        indexed: bool,
    },

    #[error("block at {pos} has a different kind than its matrix cell")]
    KindMismatch { pos: MatrixPos },

    #[error("block at {pos} has a stale neighbor snapshot")]
    StaleNeighbors { pos: MatrixPos },

    #[error("block indexed at {key} believes it lives at {stored}")]
    OrphanBlock { key: MatrixPos, stored: MatrixPos },
}

/// An invalid configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
