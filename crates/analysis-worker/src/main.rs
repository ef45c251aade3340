//! Mistake analysis worker
//!
//! Runs Stockfish over the main line of stored notes and saves a mistake
//! report per note.
//!
//! Usage: analysis-worker --notes 12,15 [--color white|black]

use analysis_worker::config::WorkerConfig;
use analysis_worker::db;
use analysis_worker::error::WorkerError;
use analysis_worker::stockfish::StockfishEngine;
use chess_core::{import_pgn, GameHeaders};
use shakmaty::Color;
use tracing::{error, info, warn};

struct Args {
    notes: Vec<i64>,
    color: Option<Color>,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut notes = Vec::new();
    let mut color = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--notes" => {
                let ids = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--notes needs a comma separated id list"))?;
                notes = parse_note_ids(ids)?;
            }
            "--color" => {
                color = match iter.next().map(|c| c.to_ascii_lowercase()).as_deref() {
                    Some("white") => Some(Color::White),
                    Some("black") => Some(Color::Black),
                    other => anyhow::bail!("--color must be white or black, got {other:?}"),
                };
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
    }

    if notes.is_empty() {
        anyhow::bail!("usage: analysis-worker --notes 1,2,3 [--color white|black]");
    }
    Ok(Args { notes, color })
}

/// Comma separated note ids; empty entries are ignored, anything else that is
/// not a number is an error.
fn parse_note_ids(list: &str) -> anyhow::Result<Vec<i64>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| anyhow::anyhow!("--notes expects numeric ids, got {s:?}"))
        })
        .collect()
}

/// Side whose tag matches the configured player, White otherwise.
fn player_color(headers: &GameHeaders, player: Option<&str>) -> Color {
    match player {
        Some(name) if headers.black().eq_ignore_ascii_case(name) => Color::Black,
        Some(name) if !headers.white().eq_ignore_ascii_case(name) => {
            warn!(player = name, "player not found in game tags, analyzing White");
            Color::White
        }
        _ => Color::White,
    }
}

async fn analyze_note(
    engine: &mut StockfishEngine,
    pool: &sqlx::PgPool,
    config: &WorkerConfig,
    note_id: i64,
    color: Option<Color>,
) -> Result<(), WorkerError> {
    let note = db::fetch_note(pool, note_id).await?;
    let game = import_pgn(&note.pgn)?;
    let player = color.unwrap_or_else(|| player_color(&game.headers, config.analyze_player.as_deref()));
    let player_name = match player {
        Color::White => "white",
        Color::Black => "black",
    };
    info!(note_id, title = %note.title, color = player_name, "Analyzing note");

    let analyzer = config.analyzer();
    let report = analyzer
        .analyze(&game.tree, player, engine, |p| {
            info!(note_id, progress = p, "Progress");
        })
        .await;

    info!(
        note_id,
        mistakes = report.move_error_details.len(),
        skipped = report.skipped_plies,
        "Analysis complete"
    );
    for detail in &report.move_error_details {
        info!(note_id, mv = %detail.move_text, drop = detail.drop, "Mistake");
    }

    db::save_mistakes(pool, note.id, player_name, analyzer.threshold, &report).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args = parse_args()?;
    let config = WorkerConfig::load()?;
    info!(
        stockfish_path = %config.stockfish_path,
        depth = config.analysis_depth,
        threshold = config.mistake_threshold,
        "Worker config loaded"
    );

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;

    let mut engine = StockfishEngine::new(&config.stockfish_path).await?;

    let mut failed = 0usize;
    for &note_id in &args.notes {
        if let Err(e) = analyze_note(&mut engine, &pool, &config, note_id, args.color).await {
            error!(note_id, error = %e, "Analysis failed");
            failed += 1;
        }
    }

    engine.quit().await;
    pool.close().await;
    info!(total = args.notes.len(), failed, "Done");

    if failed > 0 {
        anyhow::bail!("{failed} of {} notes failed", args.notes.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_ids() {
        assert_eq!(parse_note_ids("1,2, 15").unwrap(), vec![1, 2, 15]);
        assert_eq!(parse_note_ids("7,").unwrap(), vec![7]);
        let err = parse_note_ids("1,x").unwrap_err();
        assert!(err.to_string().contains("\"x\""));
    }

    #[test]
    fn test_player_color_from_tags() {
        let headers = GameHeaders::new().with("White", "alice").with("Black", "Bob");
        assert_eq!(player_color(&headers, Some("bob")), Color::Black);
        assert_eq!(player_color(&headers, Some("alice")), Color::White);
        assert_eq!(player_color(&headers, Some("carol")), Color::White);
        assert_eq!(player_color(&headers, None), Color::White);
    }
}
