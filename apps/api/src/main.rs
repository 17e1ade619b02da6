mod config;
mod draft_store;
mod errors;
mod form;
mod models;
mod routes;
mod state;
mod submission;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::draft_store::{DraftStore, FileDraftStore, MemoryDraftStore};
use crate::form::FormController;
use crate::routes::build_router;
use crate::state::AppState;
use crate::submission::GeneratorClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume form service v{}", env!("CARGO_PKG_VERSION"));

    // Initialize draft store
    let store: Arc<dyn DraftStore> = match config.draft_store {
        StoreBackend::File => {
            info!("Draft store: {}", config.draft_dir.display());
            Arc::new(FileDraftStore::new(config.draft_dir.clone()))
        }
        StoreBackend::Memory => {
            info!("Draft store: in-memory (drafts are lost on exit)");
            Arc::new(MemoryDraftStore::new())
        }
    };

    // Seed the form from the saved draft, if any
    let mut form = FormController::new(
        store,
        config.autosave_debounce,
        config.clear_draft_on_submit,
    );
    form.restore().await;
    let form = Arc::new(Mutex::new(form));

    // Initialize generator client
    let generator = GeneratorClient::new(config.generator_url.clone(), config.generator_timeout)?;
    info!("Generator client initialized ({})", generator.url());

    let state = AppState {
        form: Arc::clone(&form),
        generator,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Don't lose the last edits to the debounce window
    form.lock().await.flush().await;
    info!("Pending draft flushed, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
