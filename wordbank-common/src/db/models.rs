//! Word record models shared across the word-bank services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed reason attached to a lookup that resolved but matched no entry
pub const REASON_WORD_NOT_FOUND: &str = "Word not found in dictionary";

/// Fixed reason attached to a lookup whose payload was empty or malformed
pub const REASON_NO_DATA: &str = "No data returned from API";

/// One pronunciation of a word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phonetic {
    /// Pronunciation text (IPA or similar)
    pub text: String,
    /// Optional audio reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

/// One sense definition of a word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// The gloss text
    pub definition: String,
    /// Part-of-speech tag of the sense this definition came from
    pub part_of_speech: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

/// Difficulty tier of an example sentence
///
/// Attached per retained example for downstream display; never used for
/// filtering or ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// One retained example sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSentence {
    /// The sentence text
    pub sentence: String,
    /// Part-of-speech tag of the sense this example came from
    pub part_of_speech: String,
    /// Provenance tag (where the sentence was sourced)
    pub source: String,
    /// Difficulty tier
    pub difficulty: Difficulty,
    /// Sentence length in characters
    pub length: usize,
}

/// A word record as stored in a bank
///
/// Identity is `(collection, lowercase word)`. Records are created by a
/// separate seeding step; enrichment only updates them. After any enrichment
/// attempt, exactly one of {enrichment fields, `fetch_error`} is populated,
/// and `has_examples` matches the non-emptiness of `examples`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordRecord {
    pub collection: String,
    pub word: String,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub examples: Vec<ExampleSentence>,
    pub has_examples: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Normalized outcome of one external dictionary lookup
///
/// Ephemeral: owned by the call that produced it and discarded once folded
/// into a record update or a run outcome entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResult {
    /// Looked-up word, lowercased
    pub word: String,
    /// Whether the lookup matched a dictionary entry with usable data
    pub found: bool,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub examples: Vec<ExampleSentence>,
    /// Provenance tag, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Fetch timestamp, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    /// Reason the lookup produced no data, present when `found` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LookupResult {
    /// A lookup that resolved normally but matched no usable entry
    pub fn not_found(word: &str, reason: &str) -> Self {
        Self {
            word: word.to_lowercase(),
            found: false,
            phonetics: Vec::new(),
            definitions: Vec::new(),
            examples: Vec::new(),
            source: None,
            fetched_at: None,
            reason: Some(reason.to_string()),
        }
    }
}

/// Fields written back to a record by one enrichment attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEnrichment {
    /// False when the word was absent from the bank (update-only contract:
    /// nothing was written)
    pub applied: bool,
    pub has_examples: bool,
    pub examples: usize,
    pub definitions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Derived enrichment-state snapshot of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub collection: String,
    pub total: u64,
    pub with_examples: u64,
    pub without_examples: u64,
    pub with_errors: u64,
    /// `with_examples / total` formatted as "NN.NN%", or "0%" for an empty
    /// collection
    pub coverage_rate: String,
}

impl CollectionStats {
    /// Format the coverage ratio the way the read layer displays it
    pub fn format_coverage(with_examples: u64, total: u64) -> String {
        if total > 0 {
            format!("{:.2}%", (with_examples as f64 / total as f64) * 100.0)
        } else {
            "0%".to_string()
        }
    }
}
