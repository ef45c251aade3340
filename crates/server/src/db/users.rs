use sqlx::PgPool;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub chess_com_username: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

const USER_COLUMNS: &str = "id, username, password_hash, chess_com_username, created_at";

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    chess_com_username: Option<&str>,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, password_hash, chess_com_username) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(password_hash)
    .bind(chess_com_username)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Username already taken".into())
        }
        _ => AppError::Sqlx(e),
    })
}

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, AppError> {
    let row: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(row.0)
}

pub async fn update_password_hash(pool: &PgPool, user_id: i64, new_hash: &str) -> Result<bool, AppError> {
    let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(user_id)
        .bind(new_hash)
        .execute(pool)
        .await
        .map_err(AppError::Sqlx)?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_chess_com_username(
    pool: &PgPool,
    user_id: i64,
    chess_com_username: &str,
) -> Result<Option<String>, AppError> {
    let row: Option<(Option<String>,)> = sqlx::query_as(
        "UPDATE users SET chess_com_username = $2 WHERE id = $1 RETURNING chess_com_username",
    )
    .bind(user_id)
    .bind(chess_com_username)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)?;
    Ok(row.and_then(|r| r.0))
}
