//! Game error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("unknown boss archetype: {0}")]
    UnknownArchetype(String),

    #[error("arena map has no rows")]
    EmptyGrid,

    #[error("arena map row {row} has {got} tiles, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid tile {ch:?} at row {row}, column {col}")]
    InvalidTile { row: usize, col: usize, ch: char },
}
