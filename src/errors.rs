use thiserror::Error;

/// A grid which does not describe a legal puzzle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidState {
    #[error("Board size {0} is not supported (expected 2 to {max})", max = crate::puzzle::MAX_SIZE)]
    UnsupportedSize(usize),

    #[error("{0} tiles cannot be arranged in a square grid")]
    NotSquare(usize),

    #[error("Expected {expected} tiles, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("Tile {tile} is out of range (largest label is {max})")]
    TileOutOfRange { tile: u32, max: u32 },

    #[error("Tile {0} appears more than once")]
    DuplicateTile(u8),

    #[error("Start is {start}x{start} but goal is {goal}x{goal}")]
    SizeMismatch { start: usize, goal: usize },

    #[error("Could not parse tile {0:?}")]
    Parse(String),
}

/// Error produced when a solve cannot run to completion.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("Invalid puzzle: {0}")]
    Invalid(#[from] InvalidState),

    #[error("Step limit exhausted after {0} evaluated states")]
    StepLimitExhausted(usize),
}

/// Result when a solve might fail.
pub type Result<T> = std::result::Result<T, SolveError>;
