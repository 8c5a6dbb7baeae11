//! Batch orchestrator integration tests
//!
//! Runs the enrichment pipeline against an in-memory record store and a
//! scripted lookup stub: no network, deterministic outcomes.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wordbank_common::db::{
    Definition, Difficulty, ExampleSentence, LookupResult, WordStore, REASON_WORD_NOT_FOUND,
};
use wordbank_common::Error;
use wordbank_enricher::models::{BatchParameters, OutcomeStatus};
use wordbank_enricher::services::{EnrichError, Enricher, LookupError, WordLookup};

/// Scripted behavior for one word
#[derive(Debug, Clone, Copy)]
enum Behavior {
    /// Found with N retained examples
    Found(usize),
    /// Resolved but no dictionary entry
    NotFound,
    /// Transport failure
    Fail,
}

struct StubLookup {
    behaviors: HashMap<String, Behavior>,
    calls: AtomicUsize,
    delay: Duration,
}

impl StubLookup {
    fn new(behaviors: &[(&str, Behavior)]) -> Self {
        Self {
            behaviors: behaviors
                .iter()
                .map(|(word, behavior)| (word.to_string(), *behavior))
                .collect(),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn found_result(word: &str, example_count: usize) -> LookupResult {
    let examples = (0..example_count)
        .map(|i| {
            let sentence = format!("A usable example sentence number {} for {}.", i, word);
            ExampleSentence {
                length: sentence.chars().count(),
                sentence,
                part_of_speech: "verb".to_string(),
                source: "dictionary_api".to_string(),
                difficulty: Difficulty::Medium,
            }
        })
        .collect();

    LookupResult {
        word: word.to_lowercase(),
        found: true,
        phonetics: Vec::new(),
        definitions: vec![Definition {
            definition: format!("definition of {}", word),
            part_of_speech: "verb".to_string(),
            synonyms: Vec::new(),
            antonyms: Vec::new(),
        }],
        examples,
        source: Some("dictionary_api".to_string()),
        fetched_at: Some(Utc::now()),
        reason: None,
    }
}

#[async_trait]
impl WordLookup for StubLookup {
    async fn fetch_word(&self, word: &str) -> Result<LookupResult, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.behaviors.get(word) {
            Some(Behavior::Found(count)) => Ok(found_result(word, *count)),
            Some(Behavior::Fail) => Err(LookupError::Network("connection refused".to_string())),
            Some(Behavior::NotFound) | None => {
                Ok(LookupResult::not_found(word, REASON_WORD_NOT_FOUND))
            }
        }
    }
}

async fn seeded_store(collection: &str, words: &[&str]) -> WordStore {
    let store = WordStore::open_in_memory(vec![
        "cet4".to_string(),
        "cet6".to_string(),
        "gaokao".to_string(),
    ])
    .await
    .unwrap();
    store.seed_words(collection, words).await.unwrap();
    store
}

fn params(batch_size: usize, delay_ms: u64) -> BatchParameters {
    BatchParameters {
        batch_size,
        delay_ms,
    }
}

#[tokio::test]
async fn run_processes_every_word_and_classifies_outcomes() {
    let store = seeded_store("cet4", &["alpha", "beta", "gamma", "delta", "omega"]).await;
    let lookup = Arc::new(StubLookup::new(&[
        ("alpha", Behavior::Found(2)),
        ("beta", Behavior::Found(3)),
        ("gamma", Behavior::Found(0)),
        ("delta", Behavior::NotFound),
        ("omega", Behavior::Fail),
    ]));
    let enricher = Enricher::new(store.clone(), lookup.clone());

    let report = enricher
        .run_batch("cet4", &params(2, 500), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.processed, 5);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 3);
    assert_eq!(report.processed, report.succeeded + report.failed);
    assert!(!report.cancelled);
    assert!(report.ended_at.is_some());
    assert_eq!(report.details.len(), 5);

    let by_word: HashMap<&str, _> = report
        .details
        .iter()
        .map(|outcome| (outcome.word.as_str(), outcome))
        .collect();

    assert_eq!(by_word["alpha"].status, OutcomeStatus::Success);
    assert_eq!(by_word["alpha"].examples, Some(2));
    assert_eq!(by_word["alpha"].definitions, Some(1));
    assert_eq!(by_word["gamma"].status, OutcomeStatus::NoData);
    assert_eq!(
        by_word["gamma"].reason.as_deref(),
        Some("No usable examples retained")
    );
    assert_eq!(by_word["delta"].status, OutcomeStatus::NoData);
    assert_eq!(by_word["delta"].reason.as_deref(), Some(REASON_WORD_NOT_FOUND));
    assert_eq!(by_word["omega"].status, OutcomeStatus::Error);

    // Store state mirrors the outcomes.
    let alpha = store.get_word("cet4", "alpha").await.unwrap().unwrap();
    assert!(alpha.has_examples);
    let delta = store.get_word("cet4", "delta").await.unwrap().unwrap();
    assert_eq!(delta.fetch_error.as_deref(), Some(REASON_WORD_NOT_FOUND));
    // The failed lookup never reached the store.
    let omega = store.get_word("cet4", "omega").await.unwrap().unwrap();
    assert!(omega.fetch_error.is_none());
    assert!(omega.updated_at.is_none());
}

#[tokio::test]
async fn invalid_parameters_are_rejected_before_any_lookup() {
    let store = seeded_store("cet4", &["alpha"]).await;
    let lookup = Arc::new(StubLookup::new(&[("alpha", Behavior::Found(1))]));
    let enricher = Enricher::new(store, lookup.clone());

    for bad in [params(0, 1000), params(51, 1000), params(10, 499), params(10, 5001)] {
        let err = enricher
            .run_batch("cet4", &bad, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EnrichError::Store(Error::InvalidInput(_))));
    }

    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn unknown_collection_fails_the_whole_run() {
    let store = seeded_store("cet4", &["alpha"]).await;
    let lookup = Arc::new(StubLookup::new(&[]));
    let enricher = Enricher::new(store, lookup);

    let err = enricher
        .run_batch("toefl", &params(10, 1000), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, EnrichError::Store(Error::InvalidInput(_))));
}

#[tokio::test]
async fn inter_batch_delay_is_applied_between_batches_only() {
    // Four words, batch size 2: two batches, exactly one sleep.
    let store = seeded_store("cet4", &["a", "b", "c", "d"]).await;
    let lookup = Arc::new(StubLookup::new(&[
        ("a", Behavior::Found(1)),
        ("b", Behavior::Found(1)),
        ("c", Behavior::Found(1)),
        ("d", Behavior::Found(1)),
    ]));
    let enricher = Enricher::new(store, lookup.clone());

    let start = Instant::now();
    let report = enricher
        .run_batch("cet4", &params(2, 500), CancellationToken::new())
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.processed, 4);
    assert_eq!(lookup.calls(), 4);
    assert!(elapsed >= Duration::from_millis(500), "one inter-batch sleep expected");
    assert!(elapsed < Duration::from_millis(1500), "only one sleep expected");
}

#[tokio::test]
async fn single_batch_run_skips_the_delay() {
    let store = seeded_store("cet4", &["a", "b"]).await;
    let lookup = Arc::new(StubLookup::new(&[
        ("a", Behavior::Found(1)),
        ("b", Behavior::Found(1)),
    ]));
    let enricher = Enricher::new(store, lookup);

    let start = Instant::now();
    let report = enricher
        .run_batch("cet4", &params(10, 5000), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.processed, 2);
    assert!(start.elapsed() < Duration::from_millis(1000));
}

#[tokio::test]
async fn empty_collection_finishes_immediately() {
    let store = seeded_store("cet6", &[]).await;
    let lookup = Arc::new(StubLookup::new(&[]));
    let enricher = Enricher::new(store, lookup.clone());

    let report = enricher
        .run_batch("cet6", &params(10, 1000), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.total, 0);
    assert_eq!(report.processed, 0);
    assert!(!report.cancelled);
    assert!(report.ended_at.is_some());
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn classification_is_idempotent_across_runs() {
    let store = seeded_store("cet4", &["alpha", "beta", "gamma", "delta"]).await;
    let lookup = Arc::new(StubLookup::new(&[
        ("alpha", Behavior::Found(2)),
        ("beta", Behavior::Found(0)),
        ("gamma", Behavior::NotFound),
        ("delta", Behavior::Fail),
    ]));
    let enricher = Enricher::new(store, lookup);

    let statuses = |report: &wordbank_enricher::models::BatchRunReport| {
        let mut pairs: Vec<(String, OutcomeStatus)> = report
            .details
            .iter()
            .map(|outcome| (outcome.word.clone(), outcome.status))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    };

    let first = enricher
        .run_batch("cet4", &params(4, 500), CancellationToken::new())
        .await
        .unwrap();
    let second = enricher
        .run_batch("cet4", &params(4, 500), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(statuses(&first), statuses(&second));
}

#[tokio::test]
async fn pre_cancelled_token_stops_before_the_first_batch() {
    let store = seeded_store("cet4", &["alpha", "beta"]).await;
    let lookup = Arc::new(StubLookup::new(&[("alpha", Behavior::Found(1))]));
    let enricher = Enricher::new(store, lookup.clone());

    let token = CancellationToken::new();
    token.cancel();

    let report = enricher
        .run_batch("cet4", &params(1, 500), token)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.processed, 0);
    assert_eq!(lookup.calls(), 0);
    assert!(report.ended_at.is_some());
}

#[tokio::test]
async fn cancellation_takes_effect_at_the_next_batch_boundary() {
    let store = seeded_store("cet4", &["a", "b", "c", "d"]).await;
    let lookup = Arc::new(StubLookup::new(&[
        ("a", Behavior::Found(1)),
        ("b", Behavior::Found(1)),
        ("c", Behavior::Found(1)),
        ("d", Behavior::Found(1)),
    ]));
    let enricher = Enricher::new(store, lookup.clone());

    let token = CancellationToken::new();
    let run_token = token.clone();
    let handle = tokio::spawn(async move {
        enricher
            .run_batch("cet4", &params(2, 2000), run_token)
            .await
    });

    // First batch settles quickly; cancel during the inter-batch delay.
    tokio::time::sleep(Duration::from_millis(300)).await;
    token.cancel();

    let report = handle.await.unwrap().unwrap();
    assert!(report.cancelled);
    assert_eq!(report.processed, 2);
    assert_eq!(report.processed, report.succeeded + report.failed);
    assert_eq!(lookup.calls(), 2);
}
