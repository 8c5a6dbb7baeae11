//! Service configuration loading
//!
//! Configuration is resolved from a TOML file with environment-variable
//! overrides, in priority order:
//! 1. Environment variables (`WORDBANK_*`, highest priority)
//! 2. TOML config file (`WORDBANK_CONFIG` path, or `wordbank.toml` in the
//!    working directory)
//! 3. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default external dictionary lookup endpoint (per-word GET)
pub const DEFAULT_DICTIONARY_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

fn default_database() -> PathBuf {
    PathBuf::from("wordbank.db")
}

fn default_bind() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_dictionary_api_url() -> String {
    DEFAULT_DICTIONARY_API_URL.to_string()
}

fn default_collections() -> Vec<String> {
    vec!["cet4".to_string(), "cet6".to_string(), "gaokao".to_string()]
}

fn default_stats_cache_ttl_secs() -> u64 {
    60
}

/// Service configuration for the enricher
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Path to the SQLite record store
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Listen address for the invocation surface
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Base URL of the external dictionary lookup service
    #[serde(default = "default_dictionary_api_url")]
    pub dictionary_api_url: String,

    /// Operative set of word-bank collection names
    #[serde(default = "default_collections")]
    pub collections: Vec<String>,

    /// TTL for cached collection statistics responses, in seconds
    #[serde(default = "default_stats_cache_ttl_secs")]
    pub stats_cache_ttl_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            bind: default_bind(),
            dictionary_api_url: default_dictionary_api_url(),
            collections: default_collections(),
            stats_cache_ttl_secs: default_stats_cache_ttl_secs(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the default locations.
    ///
    /// Reads the TOML file named by `WORDBANK_CONFIG` (or `wordbank.toml` if
    /// present in the working directory), then applies environment overrides.
    /// A missing file is not an error; a malformed one is.
    pub fn load() -> Result<Self> {
        let path = std::env::var("WORDBANK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("wordbank.toml"));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config failed ({}): {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse config failed ({}): {}", path.display(), e)))
    }

    /// Apply `WORDBANK_*` environment-variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(database) = std::env::var("WORDBANK_DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Ok(bind) = std::env::var("WORDBANK_BIND") {
            self.bind = bind;
        }
        if let Ok(url) = std::env::var("WORDBANK_DICTIONARY_API_URL") {
            self.dictionary_api_url = url;
        }
    }

    /// Reject configurations that cannot possibly work
    fn validate(&self) -> Result<()> {
        if self.collections.is_empty() {
            return Err(Error::Config(
                "At least one word-bank collection must be configured".to_string(),
            ));
        }
        if self.dictionary_api_url.trim().is_empty() {
            return Err(Error::Config(
                "dictionary_api_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
