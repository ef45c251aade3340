//! Worker configuration from environment variables

use std::env;
use std::time::Duration;

use crate::error::WorkerError;
use crate::mistakes::MistakeAnalyzer;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub database_url: String,

    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Search depth per position
    pub analysis_depth: u32,

    /// Evaluation drop in pawns above which a move is a mistake
    pub mistake_threshold: f64,

    /// Per-position evaluation budget
    pub eval_timeout: Duration,

    /// Username matched against the White/Black tags to pick the analyzed side
    pub analyze_player: Option<String>,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, WorkerError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| WorkerError::Config("DATABASE_URL not set".into()))?;

        let stockfish_path = env::var("STOCKFISH_PATH")
            .unwrap_or_else(|_| "/usr/local/bin/stockfish".to_string());

        let analysis_depth = parse_var("ANALYSIS_DEPTH", 15)?;
        let mistake_threshold = parse_var("MISTAKE_THRESHOLD", 1.0)?;
        let eval_timeout = Duration::from_millis(parse_var("EVAL_TIMEOUT_MS", 5000)?);

        let analyze_player = env::var("ANALYZE_PLAYER")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            stockfish_path,
            analysis_depth,
            mistake_threshold,
            eval_timeout,
            analyze_player,
        })
    }

    pub fn analyzer(&self) -> MistakeAnalyzer {
        MistakeAnalyzer {
            threshold: self.mistake_threshold,
            depth: self.analysis_depth,
            eval_timeout: self.eval_timeout,
        }
    }
}

/// Optional numeric variable; present but malformed is an error.
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, WorkerError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| WorkerError::Config(format!("{name} is not a valid number: {raw:?}"))),
        Err(_) => Ok(default),
    }
}
