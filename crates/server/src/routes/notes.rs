use axum::{extract::Path, http::StatusCode, Extension, Json};
use chess_core::{import_pgn, note_title};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::notes::{self, Note, NoteSummary};
use crate::error::AppError;

pub const DEFAULT_NOTE_TITLE: &str = "New Game Note";

#[derive(Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    pub pgn: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateNoteRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    pub pgn: Option<String>,
}

/// Title from the game's player tags, or the default for a bare game.
pub fn derive_title(pgn: &str) -> String {
    match import_pgn(pgn) {
        Ok(game) if game.headers.get("White").is_some() || game.headers.get("Black").is_some() => {
            note_title(&game.headers)
        }
        _ => DEFAULT_NOTE_TITLE.to_string(),
    }
}

/// GET /api/notes
pub async fn list_notes(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
) -> Result<Json<Vec<NoteSummary>>, AppError> {
    Ok(Json(notes::list_notes(&pool, user.id).await?))
}

/// POST /api/notes
pub async fn create_note(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    req.validate()?;

    let title = match req.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => derive_title(&req.pgn),
    };
    let note = notes::create_note(&pool, user.id, &title, &req.pgn).await?;
    tracing::info!(note_id = note.id, user_id = user.id, "Created note");

    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/notes/{id}
pub async fn get_note(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(note_id): Path<i64>,
) -> Result<Json<Note>, AppError> {
    Ok(Json(notes::get_note(&pool, user.id, note_id).await?))
}

/// PUT /api/notes/{id}
pub async fn update_note(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(note_id): Path<i64>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, AppError> {
    req.validate()?;

    let title = req.title.as_deref().map(str::trim);
    let note = notes::update_note(&pool, user.id, note_id, title, req.pgn.as_deref()).await?;
    Ok(Json(note))
}

/// DELETE /api/notes/{id}
pub async fn delete_note(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(note_id): Path<i64>,
) -> Result<Json<JsonValue>, AppError> {
    notes::delete_note(&pool, user.id, note_id).await?;
    tracing::info!(note_id, user_id = user.id, "Deleted note");
    Ok(Json(json!({ "message": "Note deleted" })))
}
