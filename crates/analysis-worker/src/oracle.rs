//! Position evaluation interface consumed by the mistake analyzer.

use std::future::Future;

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::error::WorkerError;

/// Pawn value used for a forced mate.
pub const MATE_PAWNS: f64 = 100.0;

/// Engine score from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    Cp(i32),
    /// Mate in N; negative when the side to move is getting mated. `Mate(0)`
    /// means the side to move is already mated.
    Mate(i32),
}

impl Score {
    /// Pawns for the side to move.
    pub fn pawns(self) -> f64 {
        match self {
            Score::Cp(cp) => f64::from(cp) / 100.0,
            Score::Mate(n) if n > 0 => MATE_PAWNS,
            Score::Mate(_) => -MATE_PAWNS,
        }
    }

    /// Pawns from White's point of view, positive favours White.
    pub fn white_pawns(self, side_to_move: Color) -> f64 {
        match side_to_move {
            Color::White => self.pawns(),
            Color::Black => -self.pawns(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: Score,
    pub depth: u32,
    /// Best move in UCI notation, absent in terminal positions.
    pub best_move: Option<String>,
    pub pv: Vec<String>,
}

/// Anything that can score a FEN at a search depth.
pub trait EvalOracle {
    fn evaluate(
        &mut self,
        fen: &str,
        depth: u32,
    ) -> impl Future<Output = Result<Evaluation, WorkerError>> + Send;
}
