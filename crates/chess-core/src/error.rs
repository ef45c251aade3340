use thiserror::Error;

/// Errors raised while turning PGN text into a move tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The PGN text could not be tokenized (unbalanced braces, bad tag pair,
    /// invalid starting FEN, or no game at all).
    #[error("PGN parse error: {0}")]
    Parse(String),

    /// A ply was not legal in the position it was applied to. Only raised by
    /// the strict importer; the lenient importer skips the ply instead.
    #[error("Illegal move {san} at ply {ply}")]
    IllegalMove { san: String, ply: usize },
}

impl CoreError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        CoreError::Parse(msg.into())
    }
}
