//! Dictionary enrichment API handlers
//!
//! POST /api/dictionary/update/{collection} spawns a background run and
//! returns a job id; status and cancellation go through the job registry.
//! Statistics responses are served through the short-lived TTL cache.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;
use wordbank_common::db::{CollectionStats, LookupResult, StoredEnrichment};

use crate::jobs::JobStatus;
use crate::models::BatchParameters;
use crate::services::Enricher;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/dictionary/update/{collection} response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartUpdateResponse {
    pub job_id: Uuid,
    pub collection: String,
    pub params: BatchParameters,
}

/// POST .../cancel response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelUpdateResponse {
    pub job_id: Uuid,
    /// False when the run had already settled before the request
    pub cancelling: bool,
}

/// POST /api/dictionary/word/{collection}/{word} response
#[derive(Debug, Serialize)]
pub struct EnrichWordResponse {
    pub collection: String,
    pub lookup: LookupResult,
    pub stored: StoredEnrichment,
}

fn ensure_collection(state: &AppState, collection: &str) -> ApiResult<()> {
    if state.store.is_collection(collection) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid collection. Must be one of: {}",
            state.store.collections().join(", ")
        )))
    }
}

fn validated_word(word: &str) -> ApiResult<String> {
    let trimmed = word.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(
            "Word parameter is required".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// GET /api/dictionary/lookup/{word}
///
/// Direct lookup without touching any bank.
pub async fn lookup_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> ApiResult<Json<LookupResult>> {
    let word = validated_word(&word)?;
    let result = state.lookup.fetch_word(&word).await?;
    Ok(Json(result))
}

/// POST /api/dictionary/word/{collection}/{word}
///
/// Lookup one word and write the outcome to its bank (update-only).
pub async fn enrich_word(
    State(state): State<AppState>,
    Path((collection, word)): Path<(String, String)>,
) -> ApiResult<Json<EnrichWordResponse>> {
    ensure_collection(&state, &collection)?;
    let word = validated_word(&word)?;

    let enricher = Enricher::new(state.store.clone(), state.lookup.clone());
    let (lookup, stored) = enricher.enrich_word(&collection, &word).await?;

    Ok(Json(EnrichWordResponse {
        collection,
        lookup,
        stored,
    }))
}

/// POST /api/dictionary/update/{collection}
///
/// Kick off a background enrichment run over the whole collection.
pub async fn start_update(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(params): Json<BatchParameters>,
) -> ApiResult<Json<StartUpdateResponse>> {
    ensure_collection(&state, &collection)?;
    params.validate()?;

    if state.jobs.is_running(&collection) {
        return Err(ApiError::Conflict(format!(
            "Enrichment run already active for collection '{}'",
            collection
        )));
    }

    let enricher = Enricher::new(state.store.clone(), state.lookup.clone());
    let run_collection = collection.clone();
    let job_id = state.jobs.spawn(&collection, move |token| async move {
        enricher.run_batch(&run_collection, &params, token).await
    });

    tracing::info!(
        job_id = %job_id,
        collection = %collection,
        batch_size = params.batch_size,
        delay_ms = params.delay_ms,
        "Enrichment run scheduled"
    );

    Ok(Json(StartUpdateResponse {
        job_id,
        collection,
        params,
    }))
}

/// GET /api/dictionary/update/{collection}/{job_id}
pub async fn update_status(
    State(state): State<AppState>,
    Path((collection, job_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<JobStatus>> {
    ensure_collection(&state, &collection)?;

    let status = state
        .jobs
        .get(job_id)
        .filter(|status| status.collection == collection)
        .ok_or_else(|| ApiError::NotFound(format!("Enrichment job not found: {}", job_id)))?;

    Ok(Json(status))
}

/// POST /api/dictionary/update/{collection}/{job_id}/cancel
pub async fn cancel_update(
    State(state): State<AppState>,
    Path((collection, job_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<CancelUpdateResponse>> {
    ensure_collection(&state, &collection)?;

    let cancelling = state
        .jobs
        .cancel(job_id)
        .ok_or_else(|| ApiError::NotFound(format!("Enrichment job not found: {}", job_id)))?;

    Ok(Json(CancelUpdateResponse { job_id, cancelling }))
}

/// GET /api/dictionary/stats/{collection}
///
/// Served through the short-lived cache; the underlying computation is
/// never cached in the core.
pub async fn collection_stats(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> ApiResult<Json<CollectionStats>> {
    ensure_collection(&state, &collection)?;

    if let Some(cached) = state.stats_cache.lock().unwrap().get(&collection) {
        return Ok(Json(cached));
    }

    let stats = state.store.collection_stats(&collection).await?;
    state
        .stats_cache
        .lock()
        .unwrap()
        .insert(collection, stats.clone());

    Ok(Json(stats))
}

/// GET /api/dictionary/stats
///
/// Snapshot of every operative collection.
pub async fn all_stats(State(state): State<AppState>) -> ApiResult<Json<Vec<CollectionStats>>> {
    let collections: Vec<String> = state.store.collections().to_vec();
    let mut all = Vec::with_capacity(collections.len());

    for collection in collections {
        if let Some(cached) = state.stats_cache.lock().unwrap().get(&collection) {
            all.push(cached);
            continue;
        }
        let stats = state.store.collection_stats(&collection).await?;
        state
            .stats_cache
            .lock()
            .unwrap()
            .insert(collection, stats.clone());
        all.push(stats);
    }

    Ok(Json(all))
}

pub fn dictionary_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dictionary/lookup/:word", get(lookup_word))
        .route("/api/dictionary/word/:collection/:word", post(enrich_word))
        .route("/api/dictionary/update/:collection", post(start_update))
        .route(
            "/api/dictionary/update/:collection/:job_id",
            get(update_status),
        )
        .route(
            "/api/dictionary/update/:collection/:job_id/cancel",
            post(cancel_update),
        )
        .route("/api/dictionary/stats/:collection", get(collection_stats))
        .route("/api/dictionary/stats", get(all_stats))
}
