use std::env;

const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expire_hours: i64,
    pub host: String,
    pub port: u16,
    /// Base URL of the Chess.com public API, overridable for tests.
    pub chess_com_api_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            jwt_secret: env::var("JWT_SECRET_KEY")
                .or_else(|_| env::var("JWT_SECRET"))
                .unwrap_or_else(|_| DEV_JWT_SECRET.to_string()),
            jwt_expire_hours: env::var("JWT_EXPIRE_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            chess_com_api_url: env::var("CHESS_COM_API_URL")
                .unwrap_or_else(|_| "https://api.chess.com/pub".to_string()),
        };
        if config.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("JWT_SECRET_KEY not set, signing tokens with the development secret");
        }
        Ok(config)
    }
}
