use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use sqlx::PgPool;

use crate::auth::jwt;
use crate::config::Config;
use crate::error::AppError;

/// Authenticated user extracted from the Authorization header.
/// Use as an extractor in route handlers that require auth.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub chess_com_username: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// `Bearer <token>` or the bare token.
pub fn token_from_header(header: &str) -> Option<&str> {
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .unwrap_or(header)
        .trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pool = parts
            .extensions
            .get::<PgPool>()
            .ok_or(AppError::Internal("Missing database pool".into()))?
            .clone();

        let config = parts
            .extensions
            .get::<Config>()
            .ok_or(AppError::Internal("Missing config".into()))?
            .clone();

        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(token_from_header)
            .ok_or(AppError::Unauthorized)?;

        let claims = jwt::verify_token(token, &config.jwt_secret)
            .ok_or(AppError::Unauthorized)?;

        let user = sqlx::query_as::<_, AuthUser>(
            "SELECT id, username, chess_com_username, created_at FROM users WHERE id = $1",
        )
        .bind(claims.user_id)
        .fetch_optional(&pool)
        .await
        .map_err(AppError::Sqlx)?
        .ok_or(AppError::Unauthorized)?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_header() {
        assert_eq!(token_from_header("Bearer abc.def"), Some("abc.def"));
        assert_eq!(token_from_header("bearer abc.def"), Some("abc.def"));
        assert_eq!(token_from_header("abc.def"), Some("abc.def"));
        assert_eq!(token_from_header("Bearer "), None);
        assert_eq!(token_from_header(""), None);
    }
}
