//! Service modules for the enrichment pipeline

pub mod dictionary_client;
pub mod enrichment;
pub mod example_filter;
pub mod ttl_cache;

pub use dictionary_client::{DictionaryClient, LookupError, WordLookup};
pub use enrichment::{EnrichError, Enricher};
pub use example_filter::{classify_difficulty, filter_and_rank, ExampleCandidate};
pub use ttl_cache::TtlCache;
