//! Database connection pool initialization
//!
//! All word banks share a single SQLite database; each bank is a named
//! partition of the `words` table.

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Opens (or creates) the record store database and ensures the schema
/// exists.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to record store: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize an in-memory pool for tests and tooling.
///
/// Capped at a single connection so every handle sees the same in-memory
/// database.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the word-record table if it does not exist
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS words (
            collection TEXT NOT NULL,
            word TEXT NOT NULL,
            phonetics TEXT,
            definitions TEXT,
            examples TEXT,
            has_examples INTEGER NOT NULL DEFAULT 0,
            fetch_error TEXT,
            source TEXT,
            fetched_at TEXT,
            updated_at TEXT,
            PRIMARY KEY (collection, word)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_words_coverage ON words(collection, has_examples)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Record store tables initialized (words)");

    Ok(())
}
