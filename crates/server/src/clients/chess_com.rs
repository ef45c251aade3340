use reqwest::{Client, StatusCode};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ChessComError {
    #[error("Chess.com request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Chess.com returned HTTP {0}")]
    Status(StatusCode),
}

#[derive(Clone)]
pub struct ChessComClient {
    client: Client,
    base_url: String,
}

impl ChessComClient {
    pub fn new(base_url: &str) -> Result<Self, ChessComError> {
        let client = Client::builder()
            .user_agent("ChessNotes/1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Monthly archive URL, month zero-padded.
    pub fn month_url(&self, username: &str, year: i32, month: u32) -> String {
        format!(
            "{}/player/{}/games/{}/{:02}",
            self.base_url,
            username.to_lowercase(),
            year,
            month
        )
    }

    /// Raw `games` array of a player's monthly archive. An unknown player or
    /// an empty month yields an empty list.
    pub async fn fetch_month(&self, username: &str, year: i32, month: u32) -> Result<Vec<Value>, ChessComError> {
        let url = self.month_url(username, year, month);
        tracing::debug!(%url, "Fetching Chess.com archive");

        let resp = self.client.get(&url).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(vec![]);
        }
        if !resp.status().is_success() {
            return Err(ChessComError::Status(resp.status()));
        }

        let data: Value = resp.json().await?;
        Ok(data["games"].as_array().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_url_is_zero_padded() {
        let client = ChessComClient::new("https://api.chess.com/pub/").unwrap();
        assert_eq!(
            client.month_url("Hikaru", 2024, 3),
            "https://api.chess.com/pub/player/hikaru/games/2024/03"
        );
    }
}
