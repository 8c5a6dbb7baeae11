//! Common error types for the word-bank services

use thiserror::Error;

/// Common result type for word-bank operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the word-bank services
#[derive(Error, Debug)]
pub enum Error {
    /// Record store operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record or collection not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid caller input (unknown collection, out-of-range batch parameters)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error (serialization, corrupted stored fields)
    #[error("Internal error: {0}")]
    Internal(String),
}
