//! Stockfish engine wrapper using UCI protocol (async I/O)

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use tracing::debug;

use crate::error::WorkerError;
use crate::oracle::{EvalOracle, Evaluation, Score};

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(path: &str) -> Result<Self, WorkerError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| WorkerError::Stockfish(format!("Failed to spawn Stockfish at {path}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| WorkerError::Stockfish("Stockfish stdin unavailable".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| WorkerError::Stockfish("Stockfish stdout unavailable".into()))?;

        let mut engine = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
        };

        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        engine.send("setoption name Threads value 1").await?;
        engine.send("setoption name Hash value 64").await?;
        engine.send("setoption name UCI_AnalyseMode value true").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    async fn send(&mut self, cmd: &str) -> Result<(), WorkerError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| WorkerError::Stockfish(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| WorkerError::Stockfish(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    async fn read_line(&mut self, line: &mut String) -> Result<(), WorkerError> {
        line.clear();
        let n = self
            .stdout
            .read_line(line)
            .await
            .map_err(|e| WorkerError::Stockfish(format!("Failed to read from Stockfish: {e}")))?;
        if n == 0 {
            return Err(WorkerError::Stockfish("Stockfish closed its output".into()));
        }
        Ok(())
    }

    /// Read until `expected`, discarding everything before it.
    async fn wait_for(&mut self, expected: &str) -> Result<(), WorkerError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();
            debug!(line = trimmed, "SF >");
            if trimmed == expected {
                return Ok(());
            }
        }
    }

    /// Search a position to a fixed depth.
    ///
    /// Any search left running by a cancelled call is stopped and its output
    /// drained before the new position is sent.
    pub async fn search(&mut self, fen: &str, depth: u32) -> Result<Evaluation, WorkerError> {
        self.send("stop").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await?;

        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        let mut score = None;
        let mut reached = 0;
        let mut pv = Vec::new();

        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();

            if trimmed.starts_with("info") && trimmed.contains(" score ") {
                if let Some(cp) = parse_field(trimmed, "cp") {
                    score = Some(Score::Cp(cp));
                }
                if let Some(mate) = parse_field(trimmed, "mate") {
                    score = Some(Score::Mate(mate));
                }
                if let Some(d) = parse_field(trimmed, "depth") {
                    reached = d.max(0) as u32;
                }
                let line_pv = parse_pv(trimmed);
                if !line_pv.is_empty() {
                    pv = line_pv;
                }
            } else if trimmed.starts_with("bestmove") {
                debug!(line = trimmed, "SF >");
                let best_move = trimmed
                    .split_whitespace()
                    .nth(1)
                    .filter(|mv| *mv != "(none)")
                    .map(String::from);
                let score = score
                    .ok_or_else(|| WorkerError::Stockfish(format!("No score reported for {fen}")))?;
                return Ok(Evaluation {
                    score,
                    depth: reached,
                    best_move,
                    pv,
                });
            }
        }
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl EvalOracle for StockfishEngine {
    async fn evaluate(&mut self, fen: &str, depth: u32) -> Result<Evaluation, WorkerError> {
        self.search(fen, depth).await
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        let _ = self.process.start_kill();
    }
}

/// Integer following `key` in an info line.
fn parse_field(line: &str, key: &str) -> Option<i32> {
    let mut parts = line.split_whitespace();
    while let Some(part) = parts.next() {
        if part == key {
            return parts.next()?.parse().ok();
        }
    }
    None
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip_while(|part| *part != "pv")
        .skip(1)
        .take_while(|part| !part.starts_with("bmc") && *part != "string")
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4";
        assert_eq!(parse_field(line, "cp"), Some(35));
        assert_eq!(parse_field(line, "depth"), Some(20));
        assert_eq!(parse_field(line, "mate"), None);
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 20 score mate -3 nodes 100000 pv e2e4";
        assert_eq!(parse_field(line, "mate"), Some(-3));
    }

    #[test]
    fn test_parse_pv() {
        let line = "info depth 20 score cp 35 pv e2e4 e7e5 g1f3";
        assert_eq!(parse_pv(line), vec!["e2e4", "e7e5", "g1f3"]);
        assert!(parse_pv("info depth 1 score cp 0").is_empty());
    }
}
