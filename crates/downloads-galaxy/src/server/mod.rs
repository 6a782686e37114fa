//! Local HTTP server: one JSON scan endpoint plus static files for the viewer

mod error;
mod static_files;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::handler::HandlerWithoutStateExt;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::AppError;

use crate::scanner::{ScanOptions, Scanner};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// On-disk assets that take precedence over the ones built into the binary
    pub static_dir: Option<PathBuf>,
    pub index_page: String,
}

#[derive(Clone)]
pub struct AppState {
    scanner: Arc<Scanner>,
    static_dir: Option<PathBuf>,
    index_page: String,
}

/// Build the router. Every request to `/api/scan` runs a fresh scan.
pub fn router(options: ScanOptions, config: &ServerConfig) -> Router {
    let state = AppState {
        scanner: Arc::new(Scanner::new(options)),
        static_dir: config.static_dir.clone(),
        index_page: config.index_page.clone(),
    };

    let router = Router::new()
        .route("/api/scan", get(scan_handler))
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler));

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).fallback(static_files::embedded_handler.into_service()),
        ),
        None => router.fallback(static_files::embedded_handler),
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn scan_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let scanner = state.scanner.clone();
    // The walk is blocking filesystem work
    let result = tokio::task::spawn_blocking(move || scanner.scan()).await?;

    Ok(([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(result)))
}

async fn index_handler(State(state): State<AppState>) -> Response {
    if let Some(dir) = &state.static_dir {
        let page = dir.join(&state.index_page);
        match tokio::fs::read_to_string(&page).await {
            Ok(contents) => return Html(contents).into_response(),
            Err(e) => tracing::debug!("No viewer at {}: {}", page.display(), e),
        }
    }

    static_files::embedded_viewer(&state.index_page)
}

/// Serve until Ctrl+C.
pub async fn serve(options: ScanOptions, config: ServerConfig) -> Result<()> {
    tracing::info!(
        "Serving scans of {} (display limit {}, excluding {:?})",
        options.root.display(),
        options.display_limit,
        options.excluded_names
    );
    let app = router(options, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    tracing::info!("downloads-galaxy listening on http://{}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        // Never resolve, keep serving
        std::future::pending::<()>().await;
    }
}
