use axum::{extract::Path, Extension, Json};
use serde_json::{json, Value as JsonValue};

use crate::clients::chess_com::ChessComClient;
use crate::error::AppError;

/// GET /api/chess/games/{username}/{year}/{month}
pub async fn get_monthly_games(
    Extension(client): Extension<ChessComClient>,
    Path((username, year, month)): Path<(String, i32, u32)>,
) -> Result<Json<JsonValue>, AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest("month must be between 1 and 12".into()));
    }
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("username is required".into()));
    }

    let games = client
        .fetch_month(username.trim(), year, month)
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    Ok(Json(json!({ "games": games })))
}
