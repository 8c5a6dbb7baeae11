//! wordbank-enricher - Word Bank Enrichment Service
//!
//! Fetches phonetics, definitions and example sentences for examination
//! word banks from an external dictionary lookup service, and exposes the
//! enrichment pipeline over a small HTTP invocation surface.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wordbank_common::config::ServiceConfig;
use wordbank_common::db::WordStore;

use wordbank_enricher::services::{DictionaryClient, WordLookup};
use wordbank_enricher::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting wordbank-enricher");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::load()?;
    info!("Record store: {}", config.database.display());
    info!("Dictionary API: {}", config.dictionary_api_url);
    info!("Collections: {}", config.collections.join(", "));

    // The store client is opened once here and closed on the way out; it is
    // injected everywhere else.
    let store = WordStore::open(&config.database, config.collections.clone()).await?;
    info!("Record store connection established");

    let lookup: Arc<dyn WordLookup> = Arc::new(
        DictionaryClient::new(&config.dictionary_api_url)
            .map_err(|e| anyhow::anyhow!("Failed to create dictionary client: {}", e))?,
    );

    let state = AppState::new(store.clone(), lookup, &config);
    let app = wordbank_enricher::build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Record store closed, shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
