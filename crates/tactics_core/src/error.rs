//! Error types for the battle core.
//!
//! Combat calculators and AI policies are total functions and never fail.
//! Errors only arise at the edges: loading rules, building grids, and
//! reading or verifying replays.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for the battle core.
#[derive(Debug, Error)]
pub enum GameError {
    /// Failed to parse a combat rules file.
    #[error("Failed to parse combat rules: {0}")]
    RulesParse(#[from] ron::error::SpannedError),

    /// Combat rules parsed but hold values the formulas cannot use.
    #[error("Invalid combat rules: {0}")]
    InvalidRules(String),

    /// Filesystem error while reading or writing data.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Grid construction received inconsistent data.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A weapon id was not present in the content tables.
    #[error("Unknown weapon: {0}")]
    UnknownWeapon(String),

    /// Binary (de)serialization failure.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Re-simulating a replay produced a different result.
    #[error("Replay mismatch at entry {index}: expected hash {expected}, got {actual}")]
    ReplayMismatch {
        /// Index of the first diverging engagement.
        index: usize,
        /// Hash recorded in the replay.
        expected: u64,
        /// Hash produced by re-simulation.
        actual: u64,
    },

    /// Invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<bincode::Error> for GameError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
