//! Run-level models for the enrichment pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wordbank_common::{Error, Result};

/// Lower bound for `batch_size`
pub const MIN_BATCH_SIZE: usize = 1;
/// Upper bound for `batch_size`
pub const MAX_BATCH_SIZE: usize = 50;
/// Lower bound for `delay_ms`
pub const MIN_DELAY_MS: u64 = 500;
/// Upper bound for `delay_ms`
pub const MAX_DELAY_MS: u64 = 5000;

fn default_batch_size() -> usize {
    10
}

fn default_delay_ms() -> u64 {
    1000
}

/// Caller-supplied parameters for one enrichment run
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchParameters {
    /// Words looked up concurrently per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between consecutive batches, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for BatchParameters {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl BatchParameters {
    /// Reject out-of-range parameters before any work starts
    pub fn validate(&self) -> Result<()> {
        if self.batch_size < MIN_BATCH_SIZE || self.batch_size > MAX_BATCH_SIZE {
            return Err(Error::InvalidInput(format!(
                "batchSize must be between {} and {}",
                MIN_BATCH_SIZE, MAX_BATCH_SIZE
            )));
        }
        if self.delay_ms < MIN_DELAY_MS || self.delay_ms > MAX_DELAY_MS {
            return Err(Error::InvalidInput(format!(
                "delayMs must be between {} and {}",
                MIN_DELAY_MS, MAX_DELAY_MS
            )));
        }
        Ok(())
    }
}

/// Classification of one word's enrichment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Lookup found the word and at least one example survived the filter
    Success,
    /// Lookup resolved but produced nothing usable (not found, or zero
    /// retained examples)
    NoData,
    /// Lookup or store call failed for this word
    Error,
}

/// Per-word outcome entry in a run report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordOutcome {
    pub word: String,
    pub status: OutcomeStatus,
    /// Retained example count (success only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<usize>,
    /// Retained definition count (success only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<usize>,
    /// Why nothing usable was stored (no_data and error)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WordOutcome {
    pub fn success(word: &str, examples: usize, definitions: usize) -> Self {
        Self {
            word: word.to_string(),
            status: OutcomeStatus::Success,
            examples: Some(examples),
            definitions: Some(definitions),
            reason: None,
        }
    }

    pub fn no_data(word: &str, reason: String) -> Self {
        Self {
            word: word.to_string(),
            status: OutcomeStatus::NoData,
            examples: None,
            definitions: None,
            reason: Some(reason),
        }
    }

    pub fn error(word: &str, reason: String) -> Self {
        Self {
            word: word.to_string(),
            status: OutcomeStatus::Error,
            examples: None,
            definitions: None,
            reason: Some(reason),
        }
    }
}

/// Aggregate report for one enrichment run
///
/// Owned exclusively by the run that produced it; mutated only from the
/// orchestrating task as each batch settles, so `processed` always equals
/// `succeeded + failed` at any observation point. Returned to the caller,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRunReport {
    pub collection: String,
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// True when the run was stopped at a batch boundary by cancellation
    pub cancelled: bool,
    pub details: Vec<WordOutcome>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl BatchRunReport {
    pub fn new(collection: &str, total: usize) -> Self {
        Self {
            collection: collection.to_string(),
            total,
            processed: 0,
            succeeded: 0,
            failed: 0,
            cancelled: false,
            details: Vec::with_capacity(total),
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: None,
        }
    }

    /// Fold one settled outcome into the counters and detail list
    pub fn push(&mut self, outcome: WordOutcome) {
        self.processed += 1;
        match outcome.status {
            OutcomeStatus::Success => self.succeeded += 1,
            OutcomeStatus::NoData | OutcomeStatus::Error => self.failed += 1,
        }
        self.details.push(outcome);
    }

    /// Stamp end time and duration; the report is immutable afterwards
    pub fn finish(&mut self) {
        let ended = Utc::now();
        self.duration_ms = Some(
            (ended - self.started_at)
                .num_milliseconds()
                .max(0) as u64,
        );
        self.ended_at = Some(ended);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_are_valid() {
        let params = BatchParameters::default();
        assert_eq!(params.batch_size, 10);
        assert_eq!(params.delay_ms, 1000);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        for params in [
            BatchParameters { batch_size: 0, delay_ms: 1000 },
            BatchParameters { batch_size: 51, delay_ms: 1000 },
            BatchParameters { batch_size: 10, delay_ms: 499 },
            BatchParameters { batch_size: 10, delay_ms: 5001 },
        ] {
            assert!(params.validate().is_err(), "{:?} should be rejected", params);
        }

        assert!(BatchParameters { batch_size: 1, delay_ms: 500 }.validate().is_ok());
        assert!(BatchParameters { batch_size: 50, delay_ms: 5000 }.validate().is_ok());
    }

    #[test]
    fn parameters_accept_camel_case_json() {
        let params: BatchParameters =
            serde_json::from_str(r#"{"batchSize": 5, "delayMs": 800}"#).unwrap();
        assert_eq!(params.batch_size, 5);
        assert_eq!(params.delay_ms, 800);

        let params: BatchParameters = serde_json::from_str("{}").unwrap();
        assert_eq!(params.batch_size, 10);
        assert_eq!(params.delay_ms, 1000);
    }

    #[test]
    fn report_counters_stay_consistent() {
        let mut report = BatchRunReport::new("cet4", 3);
        report.push(WordOutcome::success("abandon", 4, 2));
        report.push(WordOutcome::no_data("zzq", "Word not found in dictionary".to_string()));
        report.push(WordOutcome::error("ability", "timeout".to_string()));

        assert_eq!(report.processed, 3);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.processed, report.succeeded + report.failed);

        report.finish();
        assert!(report.ended_at.is_some());
        assert!(report.duration_ms.is_some());
    }

    #[test]
    fn outcome_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OutcomeStatus::NoData).unwrap(),
            "\"no_data\""
        );
    }
}
