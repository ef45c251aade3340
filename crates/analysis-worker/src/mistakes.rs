//! Main-line mistake detection for one player.
//!
//! Every ply of the analyzed player is scored twice: the position before the
//! move, and the position after the opponent's reply (or after the move itself
//! when it ends the game record). A ply is flagged when the evaluation drops
//! by more than the threshold from that player's point of view.

use std::collections::BTreeSet;
use std::time::Duration;

use chess_core::position::fen_of;
use chess_core::{MoveTree, NodeId};
use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Position};
use tracing::{debug, warn};

use crate::oracle::{EvalOracle, Score};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveErrorDetail {
    /// `N. san` or `N... san`.
    pub move_text: String,
    pub move_sequence: String,
    pub eval_before: f64,
    pub eval_after: f64,
    pub drop: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeReport {
    pub flagged_move_sequences: BTreeSet<String>,
    pub move_error_details: Vec<MoveErrorDetail>,
    pub analyzed_plies: usize,
    /// Plies whose evaluation failed or timed out.
    pub skipped_plies: usize,
}

impl MistakeReport {
    pub fn is_flagged(&self, move_sequence: &str) -> bool {
        self.flagged_move_sequences.contains(move_sequence)
    }
}

#[derive(Debug, Clone)]
pub struct MistakeAnalyzer {
    /// Minimum drop in pawns; a drop exactly equal is not a mistake.
    pub threshold: f64,
    pub depth: u32,
    pub eval_timeout: Duration,
}

impl Default for MistakeAnalyzer {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            depth: 15,
            eval_timeout: Duration::from_secs(5),
        }
    }
}

impl MistakeAnalyzer {
    /// Analyze the main line of `tree` for `player`.
    ///
    /// `progress` receives `done / total` after each of the player's plies.
    /// Oracle failures never abort the run; they only skip the affected ply.
    pub async fn analyze<O, F>(
        &self,
        tree: &MoveTree,
        player: Color,
        oracle: &mut O,
        mut progress: F,
    ) -> MistakeReport
    where
        O: EvalOracle,
        F: FnMut(f64),
    {
        let main = tree.main_line();
        let nodes = main.nodes();
        let plies: Vec<usize> = (1..nodes.len())
            .filter(|&i| tree.side_to_move_at(i - 1) == player)
            .collect();
        let total = plies.len();

        let mut report = MistakeReport::default();
        for (done, &i) in plies.iter().enumerate() {
            let after_node = nodes.get(i + 1).copied().unwrap_or(nodes[i]);
            match self.score_pair(tree, nodes[i - 1], after_node, oracle).await {
                Some((eval_before, eval_after)) => {
                    report.analyzed_plies += 1;
                    let drop = match player {
                        Color::White => eval_before - eval_after,
                        Color::Black => eval_after - eval_before,
                    };
                    if drop > self.threshold {
                        let move_sequence = tree.move_sequence(&main.jump_to(i));
                        let move_text = move_text(tree.node(nodes[i - 1]).position(), tree.node(nodes[i]).san());
                        debug!(%move_text, drop, "mistake");
                        report.flagged_move_sequences.insert(move_sequence.clone());
                        report.move_error_details.push(MoveErrorDetail {
                            move_text,
                            move_sequence,
                            eval_before,
                            eval_after,
                            drop,
                        });
                    }
                }
                None => report.skipped_plies += 1,
            }
            progress((done + 1) as f64 / total as f64);
        }
        report
    }

    async fn score_pair<O: EvalOracle>(
        &self,
        tree: &MoveTree,
        before: NodeId,
        after: NodeId,
        oracle: &mut O,
    ) -> Option<(f64, f64)> {
        let before = self.score(tree.node(before).position(), oracle).await?;
        let after = self.score(tree.node(after).position(), oracle).await?;
        Some((before, after))
    }

    /// White-POV pawns for a position. Finished games are scored locally.
    async fn score<O: EvalOracle>(&self, pos: &Chess, oracle: &mut O) -> Option<f64> {
        let turn = pos.turn();
        if pos.is_checkmate() {
            return Some(Score::Mate(0).white_pawns(turn));
        }
        if pos.is_stalemate() || pos.is_insufficient_material() {
            return Some(0.0);
        }

        let fen = fen_of(pos);
        match tokio::time::timeout(self.eval_timeout, oracle.evaluate(&fen, self.depth)).await {
            Ok(Ok(eval)) => Some(eval.score.white_pawns(turn)),
            Ok(Err(e)) => {
                warn!(%fen, error = %e, "evaluation failed, skipping ply");
                None
            }
            Err(_) => {
                warn!(%fen, timeout_ms = self.eval_timeout.as_millis() as u64, "evaluation timed out, skipping ply");
                None
            }
        }
    }
}

fn move_text(before: &Chess, san: Option<&str>) -> String {
    let number = before.fullmoves().get();
    let san = san.unwrap_or_default();
    match before.turn() {
        Color::White => format!("{number}. {san}"),
        Color::Black => format!("{number}... {san}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chess_core::import_pgn;

    use super::*;
    use crate::error::WorkerError;
    use crate::oracle::Evaluation;

    /// Oracle answering from a table of White-POV centipawns keyed by the
    /// SAN sequence leading to the position. Unknown positions never answer.
    struct ScriptedOracle {
        by_fen: HashMap<String, i32>,
        calls: usize,
    }

    impl ScriptedOracle {
        fn new(tree: &MoveTree, script: &[(&str, i32)]) -> Self {
            let main = tree.main_line();
            let mut by_fen = HashMap::new();
            for (i, &id) in main.nodes().iter().enumerate() {
                let seq = tree.move_sequence(&main.jump_to(i));
                if let Some(&(_, cp)) = script.iter().find(|(s, _)| *s == seq) {
                    by_fen.insert(tree.node(id).fen(), cp);
                }
            }
            Self { by_fen, calls: 0 }
        }
    }

    impl EvalOracle for ScriptedOracle {
        async fn evaluate(&mut self, fen: &str, depth: u32) -> Result<Evaluation, WorkerError> {
            self.calls += 1;
            let Some(&white_cp) = self.by_fen.get(fen) else {
                std::future::pending::<()>().await;
                unreachable!();
            };
            let black_to_move = fen.split_whitespace().nth(1) == Some("b");
            let cp = if black_to_move { -white_cp } else { white_cp };
            Ok(Evaluation {
                score: Score::Cp(cp),
                depth,
                best_move: None,
                pv: Vec::new(),
            })
        }
    }

    fn analyzer(threshold: f64) -> MistakeAnalyzer {
        MistakeAnalyzer {
            threshold,
            depth: 10,
            eval_timeout: Duration::from_millis(50),
        }
    }

    const GAME: &str = "1. e4 e5 2. Nf3 Nc6 *";
    const SCRIPT: &[(&str, i32)] = &[
        ("", 20),
        ("e4", 30),
        ("e4 e5", 100),
        ("e4 e5 Nf3", 80),
        ("e4 e5 Nf3 Nc6", 50),
    ];

    #[tokio::test]
    async fn test_threshold_boundary_white() {
        let game = import_pgn(GAME).unwrap();

        let mut oracle = ScriptedOracle::new(&game.tree, SCRIPT);
        let report = analyzer(0.3).analyze(&game.tree, Color::White, &mut oracle, |_| {}).await;
        assert_eq!(report.analyzed_plies, 2);
        assert!(report.is_flagged("e4 e5 Nf3"));
        assert_eq!(report.flagged_move_sequences.len(), 1);
        let detail = &report.move_error_details[0];
        assert_eq!(detail.move_text, "2. Nf3");
        assert_eq!(detail.eval_before, 1.0);
        assert_eq!(detail.eval_after, 0.5);
        assert_eq!(detail.drop, 0.5);

        let mut oracle = ScriptedOracle::new(&game.tree, SCRIPT);
        let report = analyzer(0.6).analyze(&game.tree, Color::White, &mut oracle, |_| {}).await;
        assert!(report.flagged_move_sequences.is_empty());

        let mut oracle = ScriptedOracle::new(&game.tree, SCRIPT);
        let report = analyzer(0.5).analyze(&game.tree, Color::White, &mut oracle, |_| {}).await;
        assert!(report.flagged_move_sequences.is_empty());
    }

    #[tokio::test]
    async fn test_black_drop_and_last_ply() {
        let game = import_pgn(GAME).unwrap();
        let mut oracle = ScriptedOracle::new(&game.tree, SCRIPT);
        let report = analyzer(0.4).analyze(&game.tree, Color::Black, &mut oracle, |_| {}).await;

        // e5: 0.30 -> 0.80 is a 0.5 drop for Black. Nc6 is the last ply and
        // is scored against its own resulting position: 0.80 -> 0.50.
        assert_eq!(report.analyzed_plies, 2);
        assert_eq!(report.move_error_details.len(), 1);
        assert_eq!(report.move_error_details[0].move_text, "1... e5");
        assert!(report.is_flagged("e4 e5"));
    }

    #[tokio::test]
    async fn test_progress_reaches_one() {
        let game = import_pgn(GAME).unwrap();
        let mut oracle = ScriptedOracle::new(&game.tree, SCRIPT);
        let mut seen = Vec::new();
        analyzer(1.0)
            .analyze(&game.tree, Color::White, &mut oracle, |p| seen.push(p))
            .await;
        assert_eq!(seen, vec![0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_timeout_skips_ply() {
        let game = import_pgn(GAME).unwrap();
        // Nothing known about the position after 1. e4 e5.
        let script: Vec<_> = SCRIPT.iter().copied().filter(|(s, _)| *s != "e4 e5").collect();
        let mut oracle = ScriptedOracle::new(&game.tree, &script);
        let mut last = 0.0;
        let report = analyzer(0.0)
            .analyze(&game.tree, Color::White, &mut oracle, |p| last = p)
            .await;

        assert_eq!(report.skipped_plies, 2);
        assert_eq!(report.analyzed_plies, 0);
        assert!(report.flagged_move_sequences.is_empty());
        assert_eq!(last, 1.0);
    }

    #[tokio::test]
    async fn test_checkmate_scored_without_oracle() {
        let game = import_pgn("1. f3 e5 2. g4 Qh4# *").unwrap();
        let script = [("", 0), ("f3 e5", -50), ("f3 e5 g4", -300)];
        let mut oracle = ScriptedOracle::new(&game.tree, &script);
        let report = analyzer(1.0).analyze(&game.tree, Color::White, &mut oracle, |_| {}).await;

        assert!(report.is_flagged("f3 e5 g4"));
        let detail = report.move_error_details.last().unwrap();
        assert_eq!(detail.move_text, "2. g4");
        assert_eq!(detail.eval_after, -100.0);
        assert_eq!(oracle.calls, 3);
    }

    #[tokio::test]
    async fn test_empty_game() {
        let tree = MoveTree::new();
        let mut oracle = ScriptedOracle::new(&tree, &[]);
        let mut calls = 0;
        let report = analyzer(1.0).analyze(&tree, Color::White, &mut oracle, |_| calls += 1).await;
        assert_eq!(report, MistakeReport::default());
        assert_eq!(calls, 0);
    }
}
