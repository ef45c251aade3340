use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub title: String,
    pub pgn: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_modified: chrono::DateTime<chrono::Utc>,
}

/// Listing row without the PGN body.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub id: i64,
    pub title: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_modified: chrono::DateTime<chrono::Utc>,
}

const NOTE_COLUMNS: &str = "id, user_id, title, pgn, created_at, last_modified";

pub async fn create_note(pool: &PgPool, user_id: i64, title: &str, pgn: &str) -> Result<Note, AppError> {
    sqlx::query_as::<_, Note>(&format!(
        "INSERT INTO notes (user_id, title, pgn) VALUES ($1, $2, $3) RETURNING {NOTE_COLUMNS}"
    ))
    .bind(user_id)
    .bind(title)
    .bind(pgn)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)
}

pub async fn list_notes(pool: &PgPool, user_id: i64) -> Result<Vec<NoteSummary>, AppError> {
    sqlx::query_as::<_, NoteSummary>(
        "SELECT id, title, created_at, last_modified FROM notes WHERE user_id = $1 ORDER BY last_modified DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)
}

/// A note owned by `user_id`; someone else's note is reported as missing.
pub async fn get_note(pool: &PgPool, user_id: i64, note_id: i64) -> Result<Note, AppError> {
    sqlx::query_as::<_, Note>(&format!(
        "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND user_id = $2"
    ))
    .bind(note_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)?
    .ok_or_else(|| AppError::NotFound("Note not found".into()))
}

/// Same as [`get_note`] inside a transaction, holding the row lock until it
/// ends so concurrent edits of one note run one after the other.
pub async fn lock_note(conn: &mut PgConnection, user_id: i64, note_id: i64) -> Result<Note, AppError> {
    sqlx::query_as::<_, Note>(&format!(
        "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(note_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
    .map_err(AppError::Sqlx)?
    .ok_or_else(|| AppError::NotFound("Note not found".into()))
}

/// Replace the PGN of a note locked with [`lock_note`].
pub async fn save_pgn(conn: &mut PgConnection, note_id: i64, pgn: &str) -> Result<Note, AppError> {
    sqlx::query_as::<_, Note>(&format!(
        "UPDATE notes SET pgn = $2, last_modified = NOW() WHERE id = $1 RETURNING {NOTE_COLUMNS}"
    ))
    .bind(note_id)
    .bind(pgn)
    .fetch_one(conn)
    .await
    .map_err(AppError::Sqlx)
}

/// Update title and/or PGN; absent fields keep their stored value.
pub async fn update_note(
    pool: &PgPool,
    user_id: i64,
    note_id: i64,
    title: Option<&str>,
    pgn: Option<&str>,
) -> Result<Note, AppError> {
    sqlx::query_as::<_, Note>(&format!(
        r#"UPDATE notes SET
            title = COALESCE($3, title),
            pgn = COALESCE($4, pgn),
            last_modified = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING {NOTE_COLUMNS}"#
    ))
    .bind(note_id)
    .bind(user_id)
    .bind(title)
    .bind(pgn)
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)?
    .ok_or_else(|| AppError::NotFound("Note not found".into()))
}

pub async fn delete_note(pool: &PgPool, user_id: i64, note_id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
        .bind(note_id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(AppError::Sqlx)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Note not found".into()));
    }
    Ok(())
}
