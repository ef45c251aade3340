use server::clients::chess_com::ChessComClient;
use server::config;
use server::db;
use server::routes;

use axum::{routing::{get, post, put}, Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::pool::create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db::pool::run_migrations(&pool).await?;

    let chess_com = ChessComClient::new(&config.chess_com_api_url)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/auth/password", put(routes::auth::update_password))
        .route("/api/auth/chess-com", put(routes::auth::update_chess_com))
        // Notes
        .route(
            "/api/notes",
            get(routes::notes::list_notes).post(routes::notes::create_note),
        )
        .route(
            "/api/notes/{id}",
            get(routes::notes::get_note)
                .put(routes::notes::update_note)
                .delete(routes::notes::delete_note),
        )
        // Move tree editing
        .route(
            "/api/notes/{id}/moves",
            get(routes::review::get_moves).post(routes::review::apply_move),
        )
        .route("/api/notes/{id}/annotation", put(routes::review::set_annotation))
        // Mistake reports
        .route(
            "/api/notes/{id}/mistakes",
            get(routes::mistakes::get_mistakes).post(routes::mistakes::save_mistakes),
        )
        // Per-move analysis
        .route("/api/analysis", post(routes::analysis::save_analysis))
        .route("/api/analysis/{note_id}", get(routes::analysis::get_all_analyses))
        .route("/api/analysis/{note_id}/{move_path}", get(routes::analysis::get_analysis))
        // Chess.com proxy
        .route(
            "/api/chess/games/{username}/{year}/{month}",
            get(routes::chess::get_monthly_games),
        )
        // Shared state
        .layer(Extension(pool.clone()))
        .layer(Extension(config.clone()))
        .layer(Extension(chess_com))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Closing database pool");
    pool.close().await;
    Ok(())
}
