use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Final result token of a game. Not a move, so it never gets a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2", alias = "½-½")]
    Draw,
    #[default]
    #[serde(rename = "*")]
    Ongoing,
}

impl GameResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Ongoing => "*",
        }
    }

    pub fn is_decided(&self) -> bool {
        *self != GameResult::Ongoing
    }

    /// Inspect the last whitespace-delimited token of raw PGN text.
    /// Anything that is not a result token counts as an unfinished game.
    pub fn from_pgn_tail(pgn: &str) -> Self {
        pgn.split_whitespace()
            .last()
            .and_then(|tok| tok.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameResult {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1-0" => Ok(GameResult::WhiteWins),
            "0-1" => Ok(GameResult::BlackWins),
            "1/2-1/2" | "½-½" => Ok(GameResult::Draw),
            "*" => Ok(GameResult::Ongoing),
            _ => Err(()),
        }
    }
}

/// PGN tag pairs in source order. Unknown tags are kept so they survive a
/// load/save cycle through the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHeaders {
    tags: Vec<(String, String)>,
}

impl GameHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a tag, replacing an existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.tags.push((key, value)),
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn white(&self) -> &str {
        self.non_empty("White").unwrap_or("White")
    }

    pub fn black(&self) -> &str {
        self.non_empty("Black").unwrap_or("Black")
    }

    pub fn white_elo(&self) -> &str {
        self.get("WhiteElo").unwrap_or("")
    }

    pub fn black_elo(&self) -> &str {
        self.get("BlackElo").unwrap_or("")
    }

    pub fn event(&self) -> &str {
        self.non_empty("Event").unwrap_or("Chess Game")
    }

    pub fn date(&self) -> Option<&str> {
        self.non_empty("Date")
    }

    /// The custom starting FEN, only honoured when `SetUp` is "1".
    pub fn setup_fen(&self) -> Option<&str> {
        if self.get("SetUp") == Some("1") {
            self.non_empty("FEN")
        } else {
            None
        }
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }
}

/// Title shown in the notes list, e.g. `alice (1500) vs bob (1600) - 2024.03.01`.
pub fn note_title(headers: &GameHeaders) -> String {
    format!(
        "{} ({}) vs {} ({}) - {}",
        headers.white(),
        headers.white_elo(),
        headers.black(),
        headers.black_elo(),
        headers.date().unwrap_or("Unknown Date"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_tail() {
        assert_eq!(GameResult::from_pgn_tail("1. e4 e5 1-0"), GameResult::WhiteWins);
        assert_eq!(GameResult::from_pgn_tail("1. e4 e5 ½-½\n"), GameResult::Draw);
        assert_eq!(GameResult::from_pgn_tail("1. e4 e5"), GameResult::Ongoing);
        assert_eq!(GameResult::from_pgn_tail(""), GameResult::Ongoing);
        assert_eq!(GameResult::Draw.to_string(), "1/2-1/2");
    }

    #[test]
    fn test_headers_defaults() {
        let headers = GameHeaders::new().with("White", "alice").with("Black", "");
        assert_eq!(headers.white(), "alice");
        assert_eq!(headers.black(), "Black");
        assert_eq!(headers.event(), "Chess Game");
        assert!(headers.setup_fen().is_none());
    }

    #[test]
    fn test_setup_fen_requires_setup_flag() {
        let fen = "8/8/8/8/8/8/8/K6k w - - 0 1";
        let headers = GameHeaders::new().with("FEN", fen);
        assert!(headers.setup_fen().is_none());
        let headers = headers.with("SetUp", "1");
        assert_eq!(headers.setup_fen(), Some(fen));
    }

    #[test]
    fn test_note_title() {
        let headers = GameHeaders::new()
            .with("White", "alice")
            .with("Black", "bob")
            .with("WhiteElo", "1500")
            .with("BlackElo", "1600")
            .with("Date", "2024.03.01");
        assert_eq!(note_title(&headers), "alice (1500) vs bob (1600) - 2024.03.01");
    }
}
