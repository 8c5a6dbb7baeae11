//! External dictionary lookup client
//!
//! One outbound GET per word against a dictionaryapi.dev-compatible
//! endpoint. A not-found response is a normal outcome (`found = false`),
//! never an error; transport and protocol failures surface as
//! `LookupError` and are handled per word by the orchestrator.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use wordbank_common::db::{Definition, LookupResult, Phonetic, REASON_NO_DATA, REASON_WORD_NOT_FOUND};

use crate::services::example_filter::{filter_and_rank, ExampleCandidate};

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);
const USER_AGENT: &str = concat!("wordbank-enricher/", env!("CARGO_PKG_VERSION"));

/// Provenance tag attached to everything this client returns
const SOURCE: &str = "dictionary_api";

/// Maximum phonetics kept per word
const MAX_PHONETICS: usize = 3;
/// Maximum definitions kept per word
const MAX_DEFINITIONS: usize = 5;
/// Maximum examples kept per word, post-filtering
const MAX_EXAMPLES: usize = 8;

/// Dictionary lookup errors
///
/// Retryable by omission only: a failed word is recorded as failed for this
/// pass, no automatic retry.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),
}

/// Per-word dictionary lookup
///
/// The orchestrator depends on this seam rather than on a concrete HTTP
/// client, so runs are testable against scripted lookups.
#[async_trait]
pub trait WordLookup: Send + Sync {
    /// Look up one trimmed, non-empty word (caller validates)
    async fn fetch_word(&self, word: &str) -> Result<LookupResult, LookupError>;
}

// Wire DTOs for the lookup payload: a JSON array of sense entries. Every
// field is tolerated as absent; normalization decides what is usable.

#[derive(Debug, Deserialize)]
pub(crate) struct ApiEntry {
    #[serde(default)]
    phonetics: Vec<ApiPhonetic>,
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Debug, Deserialize)]
struct ApiPhonetic {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMeaning {
    #[serde(rename = "partOfSpeech", default)]
    part_of_speech: String,
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
}

#[derive(Debug, Deserialize)]
struct ApiDefinition {
    #[serde(default)]
    definition: String,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    antonyms: Vec<String>,
}

/// Dictionary API client
pub struct DictionaryClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl DictionaryClient {
    pub fn new(base_url: &str) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WordLookup for DictionaryClient {
    async fn fetch_word(&self, word: &str) -> Result<LookupResult, LookupError> {
        let url = format!("{}/{}", self.base_url, word);

        tracing::debug!(word = %word, url = %url, "Querying dictionary API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(LookupResult::not_found(word, REASON_WORD_NOT_FOUND));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), error_text));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        // An empty or malformed payload is a normal no-data outcome, not a
        // lookup failure.
        let result = match serde_json::from_str::<Vec<ApiEntry>>(&body) {
            Ok(entries) => normalize_entries(word, entries),
            Err(e) => {
                tracing::warn!(word = %word, error = %e, "Malformed lookup payload");
                LookupResult::not_found(word, REASON_NO_DATA)
            }
        };

        tracing::debug!(
            word = %result.word,
            found = result.found,
            examples = result.examples.len(),
            definitions = result.definitions.len(),
            "Dictionary lookup complete"
        );

        Ok(result)
    }
}

/// Normalize a raw lookup payload into a `LookupResult`.
///
/// Takes the first sense entry, keeps phonetics with pronunciation text
/// (≤3) and non-empty definitions (≤5), and runs the example sentences
/// through the quality filter (≤8 retained). An empty payload maps to
/// `found = false`, not an error.
pub(crate) fn normalize_entries(word: &str, entries: Vec<ApiEntry>) -> LookupResult {
    let Some(entry) = entries.into_iter().next() else {
        return LookupResult::not_found(word, REASON_NO_DATA);
    };

    let phonetics: Vec<Phonetic> = entry
        .phonetics
        .into_iter()
        .filter_map(|p| {
            let text = p.text.filter(|t| !t.is_empty())?;
            Some(Phonetic {
                text,
                audio: p.audio.filter(|a| !a.is_empty()),
            })
        })
        .take(MAX_PHONETICS)
        .collect();

    let mut definitions = Vec::new();
    let mut candidates = Vec::new();

    for meaning in entry.meanings {
        for def in meaning.definitions {
            if !def.definition.is_empty() {
                definitions.push(Definition {
                    definition: def.definition,
                    part_of_speech: meaning.part_of_speech.clone(),
                    synonyms: def.synonyms,
                    antonyms: def.antonyms,
                });
            }

            if let Some(example) = def.example {
                candidates.push(ExampleCandidate {
                    sentence: example,
                    part_of_speech: meaning.part_of_speech.clone(),
                });
            }
        }
    }

    definitions.truncate(MAX_DEFINITIONS);

    let mut examples = filter_and_rank(candidates, SOURCE);
    examples.truncate(MAX_EXAMPLES);

    LookupResult {
        word: word.to_lowercase(),
        found: true,
        phonetics,
        definitions,
        examples,
        source: Some(SOURCE.to_string()),
        fetched_at: Some(Utc::now()),
        reason: None,
    }
}
