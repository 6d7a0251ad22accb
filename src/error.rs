//! Error types for the noughts crate

use thiserror::Error;

/// Main error type for the noughts crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: position {position} is already occupied")]
    InvalidMove { position: usize },

    #[error("position {position} is out of bounds (must be 0-8)")]
    InvalidPosition { position: usize },

    #[error("game already over")]
    GameOver,

    #[error("game is still in progress")]
    GameInProgress,

    #[error("board string has wrong length: expected {expected} cells, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("no policy action recorded for state '{state}'")]
    NoPolicyEntry { state: String },

    #[error("value iteration did not converge within {sweeps} sweeps")]
    SolverNotConverged { sweeps: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("input stream ended before a move was entered")]
    PromptClosed,

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
