//! Batch enrichment orchestrator
//!
//! Drives one end-to-end enrichment pass over a collection: partitions the
//! word list into fixed-size batches, runs each batch's lookups and store
//! writes concurrently, joins the results back before the next batch, and
//! paces consecutive batches with a delay so the aggregate request rate
//! stays within the external service's tolerance. Batches are strictly
//! sequential, never pipelined; batch width is the sole concurrency
//! control.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use wordbank_common::db::WordStore;

use crate::models::{BatchParameters, BatchRunReport, WordOutcome};
use crate::services::dictionary_client::{LookupError, WordLookup};

/// Reason recorded when a lookup resolved but no example survived the filter
const REASON_NO_USABLE_EXAMPLES: &str = "No usable examples retained";

/// Enrichment pipeline errors for run-level failures.
///
/// Per-word lookup and store failures never surface here; they are caught
/// inside the batch and recorded as `error` outcome entries.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// The external lookup failed (single-word path only)
    #[error("Dictionary lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// Store failure, unknown collection, or invalid batch parameters
    #[error(transparent)]
    Store(#[from] wordbank_common::Error),
}

/// Batch enrichment orchestrator
#[derive(Clone)]
pub struct Enricher {
    store: WordStore,
    lookup: Arc<dyn WordLookup>,
}

impl Enricher {
    pub fn new(store: WordStore, lookup: Arc<dyn WordLookup>) -> Self {
        Self { store, lookup }
    }

    /// Enrich a single word and write it back to its bank.
    ///
    /// Used by the single-word invocation surface; lookup failures propagate
    /// to the caller here, unlike inside a batch run.
    pub async fn enrich_word(
        &self,
        collection: &str,
        word: &str,
    ) -> Result<(wordbank_common::db::LookupResult, wordbank_common::db::StoredEnrichment), EnrichError>
    {
        let lookup = self.lookup.fetch_word(word).await?;
        let stored = self.store.apply_enrichment(collection, word, &lookup).await?;
        Ok((lookup, stored))
    }

    /// Run one full enrichment pass over a collection.
    ///
    /// Parameters are validated before any work starts. The cancellation
    /// token is checked at each batch boundary; a cancelled run returns its
    /// report early with `cancelled` set and counters consistent for the
    /// words actually processed. The inter-batch delay is skipped after the
    /// final batch.
    pub async fn run_batch(
        &self,
        collection: &str,
        params: &BatchParameters,
        cancel: CancellationToken,
    ) -> Result<BatchRunReport, EnrichError> {
        params.validate()?;

        let words = self.store.list_words(collection).await?;
        let total_batches = words.len().div_ceil(params.batch_size);
        let mut report = BatchRunReport::new(collection, words.len());

        tracing::info!(
            collection = %collection,
            total = words.len(),
            batches = total_batches,
            batch_size = params.batch_size,
            delay_ms = params.delay_ms,
            "Starting enrichment run"
        );

        for (index, batch) in words.chunks(params.batch_size).enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(
                    collection = %collection,
                    processed = report.processed,
                    total = report.total,
                    "Enrichment run cancelled at batch boundary"
                );
                report.cancelled = true;
                break;
            }

            tracing::debug!(
                collection = %collection,
                batch = index + 1,
                batches = total_batches,
                words = ?batch,
                "Processing batch"
            );

            // Every member of the batch runs concurrently; outcomes are
            // folded into the report only after the whole batch settles.
            let outcomes = futures::future::join_all(
                batch.iter().map(|word| self.process_word(collection, word)),
            )
            .await;

            for outcome in outcomes {
                report.push(outcome);
            }

            tracing::info!(
                collection = %collection,
                processed = report.processed,
                total = report.total,
                succeeded = report.succeeded,
                failed = report.failed,
                "Batch settled"
            );

            if index + 1 < total_batches {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(params.delay_ms)) => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        report.finish();

        tracing::info!(
            collection = %collection,
            succeeded = report.succeeded,
            failed = report.failed,
            cancelled = report.cancelled,
            duration_ms = report.duration_ms,
            "Enrichment run finished"
        );

        Ok(report)
    }

    /// Process one word: lookup, store write, outcome classification.
    ///
    /// Failures are contained here so one word can never abort, block, or
    /// roll back its siblings.
    async fn process_word(&self, collection: &str, word: &str) -> WordOutcome {
        let lookup = match self.lookup.fetch_word(word).await {
            Ok(lookup) => lookup,
            Err(e) => {
                tracing::error!(word = %word, error = %e, "Dictionary lookup failed");
                return WordOutcome::error(word, e.to_string());
            }
        };

        if let Err(e) = self.store.apply_enrichment(collection, word, &lookup).await {
            tracing::error!(word = %word, error = %e, "Store write failed");
            return WordOutcome::error(word, e.to_string());
        }

        if lookup.found && !lookup.examples.is_empty() {
            WordOutcome::success(word, lookup.examples.len(), lookup.definitions.len())
        } else {
            let reason = lookup
                .reason
                .unwrap_or_else(|| REASON_NO_USABLE_EXAMPLES.to_string());
            WordOutcome::no_data(word, reason)
        }
    }
}
