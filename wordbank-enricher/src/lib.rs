//! wordbank-enricher library interface
//!
//! The enrichment pipeline for examination word banks: fetches phonetics,
//! definitions and example sentences from an external dictionary lookup
//! service, scores the examples, and writes results back to the per-bank
//! record store with bounded per-batch concurrency and inter-batch pacing.
//!
//! The core (`services::Enricher`) is plain async function calls; the
//! `api` module is the thin HTTP layer that schedules runs and reads
//! statistics.

pub mod api;
pub mod error;
pub mod jobs;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wordbank_common::config::ServiceConfig;
use wordbank_common::db::{CollectionStats, WordStore};

use crate::jobs::JobRegistry;
use crate::services::{TtlCache, WordLookup};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store client (explicit open/close lifecycle, owned by main)
    pub store: WordStore,
    /// External dictionary lookup
    pub lookup: Arc<dyn WordLookup>,
    /// Background enrichment runs
    pub jobs: JobRegistry,
    /// Short-lived cache for statistics responses
    pub stats_cache: Arc<Mutex<TtlCache<String, CollectionStats>>>,
}

impl AppState {
    pub fn new(store: WordStore, lookup: Arc<dyn WordLookup>, config: &ServiceConfig) -> Self {
        Self {
            store,
            lookup,
            jobs: JobRegistry::new(),
            stats_cache: Arc::new(Mutex::new(TtlCache::new(Duration::from_secs(
                config.stats_cache_ttl_secs,
            )))),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::dictionary_routes())
        .merge(api::health_routes())
        .with_state(state)
}
