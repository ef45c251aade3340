//! Move-tree editing on a stored note.
//!
//! The stored PGN is the only state: every request locks the note row,
//! imports it, works on the resulting tree, and writes the re-exported PGN
//! back in the same transaction. Moves are addressed by
//! their line, the child index taken at every step from the root.

use axum::{extract::Path, Extension, Json};
use chess_core::{
    export_pgn, import_or_empty, import_pgn, render_move_list, DisplayEntry, ImportedGame, MovePath,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::notes;
use crate::error::AppError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovesResponse {
    pub note_id: i64,
    pub title: String,
    pub headers: Vec<(String, String)>,
    pub result: String,
    pub start_fen: String,
    pub moves: Vec<DisplayEntry>,
    pub main_line: Vec<usize>,
    /// Set when the stored PGN could not be read and an empty game is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMoveRequest {
    #[serde(default)]
    pub line: Vec<usize>,
    #[validate(length(equal = 2, message = "Squares look like e2"))]
    pub from: String,
    #[validate(length(equal = 2, message = "Squares look like e4"))]
    pub to: String,
    #[validate(length(equal = 1, message = "Promotion is one of q, r, b, n"))]
    pub promotion: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMoveResponse {
    pub line: Vec<usize>,
    pub san: String,
    pub fen: String,
    pub move_sequence: String,
    pub pgn: String,
    pub moves: Vec<DisplayEntry>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRequest {
    #[serde(default)]
    pub line: Vec<usize>,
    #[validate(length(max = 10000, message = "Annotation must be at most 10000 characters"))]
    pub annotation: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationResponse {
    pub line: Vec<usize>,
    pub annotation: String,
    pub pgn: String,
}

fn moves_response(note: &notes::Note, game: &ImportedGame, warning: Option<String>) -> MovesResponse {
    let main = game.tree.main_line();
    MovesResponse {
        note_id: note.id,
        title: note.title.clone(),
        headers: game
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        result: game.result.to_string(),
        start_fen: game.tree.node(game.tree.root()).fen(),
        moves: render_move_list(&game.tree, game.result),
        main_line: game.tree.line_of(&main),
        warning,
    }
}

fn resolve_line(game: &ImportedGame, line: &[usize]) -> Result<MovePath, AppError> {
    game.tree
        .path_from_line(line)
        .ok_or_else(|| AppError::BadRequest(format!("No move at line {line:?}")))
}

/// GET /api/notes/{id}/moves
pub async fn get_moves(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(note_id): Path<i64>,
) -> Result<Json<MovesResponse>, AppError> {
    let note = notes::get_note(&pool, user.id, note_id).await?;
    let (game, error) = import_or_empty(&note.pgn);
    let warning = error.map(|e| {
        tracing::warn!(note_id, error = %e, "Stored PGN failed to import");
        format!("Could not read the saved game, showing an empty board: {e}")
    });
    Ok(Json(moves_response(&note, &game, warning)))
}

/// POST /api/notes/{id}/moves
pub async fn apply_move(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(note_id): Path<i64>,
    Json(req): Json<ApplyMoveRequest>,
) -> Result<Json<ApplyMoveResponse>, AppError> {
    req.validate()?;

    let mut tx = pool.begin().await?;
    let note = notes::lock_note(&mut tx, user.id, note_id).await?;
    let mut game = import_pgn(&note.pgn)?;
    let path = resolve_line(&game, &req.line)?;
    let promotion = req.promotion.as_deref().and_then(|p| p.chars().next());

    let new_path = game
        .tree
        .apply_move(&path, &req.from, &req.to, promotion)
        .ok_or_else(|| AppError::BadRequest(format!("Illegal move {}{}", req.from, req.to)))?;

    let pgn = export_pgn(&game.tree, game.result, &game.headers);
    notes::save_pgn(&mut tx, note_id, &pgn).await?;
    tx.commit().await?;

    let node = game.tree.node(new_path.last());
    tracing::debug!(note_id, san = node.san().unwrap_or_default(), "Applied move");
    Ok(Json(ApplyMoveResponse {
        line: game.tree.line_of(&new_path),
        san: node.san().unwrap_or_default().to_string(),
        fen: node.fen(),
        move_sequence: game.tree.move_sequence(&new_path),
        moves: render_move_list(&game.tree, game.result),
        pgn,
    }))
}

/// PUT /api/notes/{id}/annotation
pub async fn set_annotation(
    Extension(pool): Extension<PgPool>,
    user: AuthUser,
    Path(note_id): Path<i64>,
    Json(req): Json<AnnotationRequest>,
) -> Result<Json<AnnotationResponse>, AppError> {
    req.validate()?;

    let mut tx = pool.begin().await?;
    let note = notes::lock_note(&mut tx, user.id, note_id).await?;
    let mut game = import_pgn(&note.pgn)?;
    let path = resolve_line(&game, &req.line)?;

    let text = req.annotation.trim().to_string();
    game.tree.set_annotation(path.last(), text.clone());

    let pgn = export_pgn(&game.tree, game.result, &game.headers);
    notes::save_pgn(&mut tx, note_id, &pgn).await?;
    tx.commit().await?;

    Ok(Json(AnnotationResponse {
        line: req.line,
        annotation: text,
        pgn,
    }))
}
