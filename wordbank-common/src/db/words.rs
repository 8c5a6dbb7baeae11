//! Record store adapter for word banks
//!
//! The store client is explicitly constructed and injected; callers own its
//! open/close lifecycle. Enrichment writes are update-only: a word absent
//! from a bank is never created by `apply_enrichment` (upsert is disabled by
//! contract — seeding is a separate step).

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::sync::Arc;

use crate::db::init::{init_database_pool, init_memory_pool};
use crate::db::models::{
    CollectionStats, Definition, ExampleSentence, LookupResult, Phonetic, StoredEnrichment,
    WordRecord,
};
use crate::{Error, Result};

/// Record store client for the word banks
///
/// Cheap to clone: the connection pool and the operative collection set are
/// shared.
#[derive(Clone)]
pub struct WordStore {
    pool: SqlitePool,
    collections: Arc<Vec<String>>,
}

impl WordStore {
    /// Open the record store at `db_path`, creating schema if missing
    pub async fn open(db_path: &Path, collections: Vec<String>) -> Result<Self> {
        let pool = init_database_pool(db_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to open record store: {}", e)))?;
        Ok(Self::with_pool(pool, collections))
    }

    /// Open an in-memory store (tests and tooling)
    pub async fn open_in_memory(collections: Vec<String>) -> Result<Self> {
        let pool = init_memory_pool()
            .await
            .map_err(|e| Error::Config(format!("Failed to open record store: {}", e)))?;
        Ok(Self::with_pool(pool, collections))
    }

    /// Wrap an already-initialized pool
    pub fn with_pool(pool: SqlitePool, collections: Vec<String>) -> Self {
        Self {
            pool,
            collections: Arc::new(collections),
        }
    }

    /// The operative collection set
    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    /// Whether `collection` belongs to the operative set
    pub fn is_collection(&self, collection: &str) -> bool {
        self.collections.iter().any(|c| c == collection)
    }

    /// Close the underlying pool; idempotent
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Liveness probe for the health surface
    pub async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    fn ensure_collection(&self, collection: &str) -> Result<()> {
        if self.is_collection(collection) {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Invalid collection '{}'. Must be one of: {}",
                collection,
                self.collections.join(", ")
            )))
        }
    }

    /// List all word identifiers in a collection (full, unordered scan)
    pub async fn list_words(&self, collection: &str) -> Result<Vec<String>> {
        self.ensure_collection(collection)?;

        let words = sqlx::query_scalar::<_, String>("SELECT word FROM words WHERE collection = ?")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        Ok(words)
    }

    /// Seed identity-only rows for a bank; existing words are left untouched.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn seed_words(&self, collection: &str, words: &[&str]) -> Result<u64> {
        self.ensure_collection(collection)?;

        let mut inserted = 0;
        for word in words {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO words (collection, word, has_examples) VALUES (?, ?, 0)",
            )
            .bind(collection)
            .bind(word.trim().to_lowercase())
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }

        tracing::info!(collection, inserted, "Seeded word bank");
        Ok(inserted)
    }

    /// Write one lookup outcome onto a record, update-only.
    ///
    /// A found result replaces the enrichment fields and clears any previous
    /// fetch error; a not-found result records the error reason and clears
    /// the enrichment fields. Either way the record ends up with exactly one
    /// of the two populated. When the word is absent from the bank, no row
    /// is written and `applied` is false.
    pub async fn apply_enrichment(
        &self,
        collection: &str,
        word: &str,
        lookup: &LookupResult,
    ) -> Result<StoredEnrichment> {
        self.ensure_collection(collection)?;

        let key = word.trim().to_lowercase();
        let updated_at = Utc::now();

        let result = if lookup.found {
            let phonetics = to_json(&lookup.phonetics)?;
            let definitions = to_json(&lookup.definitions)?;
            let examples = to_json(&lookup.examples)?;
            let has_examples = !lookup.examples.is_empty();
            let fetched_at = lookup.fetched_at.unwrap_or(updated_at).to_rfc3339();

            sqlx::query(
                r#"
                UPDATE words SET
                    phonetics = ?,
                    definitions = ?,
                    examples = ?,
                    has_examples = ?,
                    fetch_error = NULL,
                    source = ?,
                    fetched_at = ?,
                    updated_at = ?
                WHERE collection = ? AND word = ?
                "#,
            )
            .bind(phonetics)
            .bind(definitions)
            .bind(examples)
            .bind(has_examples)
            .bind(&lookup.source)
            .bind(fetched_at)
            .bind(updated_at.to_rfc3339())
            .bind(collection)
            .bind(&key)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE words SET
                    phonetics = NULL,
                    definitions = NULL,
                    examples = NULL,
                    has_examples = 0,
                    fetch_error = ?,
                    source = NULL,
                    fetched_at = NULL,
                    updated_at = ?
                WHERE collection = ? AND word = ?
                "#,
            )
            .bind(&lookup.reason)
            .bind(updated_at.to_rfc3339())
            .bind(collection)
            .bind(&key)
            .execute(&self.pool)
            .await?
        };

        let applied = result.rows_affected() > 0;
        if !applied {
            tracing::debug!(
                collection,
                word = %key,
                "Word not present in bank; enrichment skipped (update-only contract)"
            );
        }

        Ok(StoredEnrichment {
            applied,
            has_examples: lookup.found && !lookup.examples.is_empty(),
            examples: lookup.examples.len(),
            definitions: lookup.definitions.len(),
            fetch_error: if lookup.found {
                None
            } else {
                lookup.reason.clone()
            },
            updated_at,
        })
    }

    /// Fetch one full record by lowercase word key
    pub async fn get_word(&self, collection: &str, word: &str) -> Result<Option<WordRecord>> {
        self.ensure_collection(collection)?;

        let key = word.trim().to_lowercase();
        let row = sqlx::query(
            r#"
            SELECT collection, word, phonetics, definitions, examples,
                   has_examples, fetch_error, source, fetched_at, updated_at
            FROM words
            WHERE collection = ? AND word = ?
            "#,
        )
        .bind(collection)
        .bind(&key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let phonetics: Vec<Phonetic> = from_json_column(row.get("phonetics"))?;
                let definitions: Vec<Definition> = from_json_column(row.get("definitions"))?;
                let examples: Vec<ExampleSentence> = from_json_column(row.get("examples"))?;
                let has_examples: i64 = row.get("has_examples");

                Ok(Some(WordRecord {
                    collection: row.get("collection"),
                    word: row.get("word"),
                    phonetics,
                    definitions,
                    examples,
                    has_examples: has_examples != 0,
                    fetch_error: row.get("fetch_error"),
                    source: row.get("source"),
                    fetched_at: parse_timestamp(row.get("fetched_at"))?,
                    updated_at: parse_timestamp(row.get("updated_at"))?,
                }))
            }
            None => Ok(None),
        }
    }

    /// Compute the derived enrichment-state snapshot for one collection.
    ///
    /// Four independent count queries; read-only and safe to run against an
    /// in-flight enrichment pass (the snapshot is best-effort, not a
    /// consistent point-in-time view).
    pub async fn collection_stats(&self, collection: &str) -> Result<CollectionStats> {
        self.ensure_collection(collection)?;

        let total = self.count(collection, None).await?;
        let with_examples = self.count(collection, Some("has_examples = 1")).await?;
        let without_examples = self.count(collection, Some("has_examples = 0")).await?;
        let with_errors = self.count(collection, Some("fetch_error IS NOT NULL")).await?;

        Ok(CollectionStats {
            collection: collection.to_string(),
            total,
            with_examples,
            without_examples,
            with_errors,
            coverage_rate: CollectionStats::format_coverage(with_examples, total),
        })
    }

    async fn count(&self, collection: &str, predicate: Option<&str>) -> Result<u64> {
        let sql = match predicate {
            Some(p) => format!("SELECT COUNT(*) FROM words WHERE collection = ? AND {}", p),
            None => "SELECT COUNT(*) FROM words WHERE collection = ?".to_string(),
        };

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Internal(format!("Failed to serialize record field: {}", e)))
}

fn from_json_column<T: serde::de::DeserializeOwned>(column: Option<String>) -> Result<Vec<T>> {
    match column {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| Error::Internal(format!("Failed to deserialize record field: {}", e))),
        None => Ok(Vec::new()),
    }
}

fn parse_timestamp(column: Option<String>) -> Result<Option<DateTime<Utc>>> {
    match column {
        Some(text) => {
            let parsed = DateTime::parse_from_rfc3339(&text)
                .map_err(|e| Error::Internal(format!("Failed to parse timestamp: {}", e)))?;
            Ok(Some(parsed.with_timezone(&Utc)))
        }
        None => Ok(None),
    }
}
