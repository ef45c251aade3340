//! Worker error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stockfish error: {0}")]
    Stockfish(String),

    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    #[error("PGN error: {0}")]
    Pgn(#[from] chess_core::CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
