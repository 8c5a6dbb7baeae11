//! HTTP invocation surface
//!
//! Thin scheduling layer over the core pipeline: kick off and cancel
//! enrichment runs, look up single words, read collection statistics. No
//! business logic lives here.

mod dictionary;
mod health;

pub use dictionary::dictionary_routes;
pub use health::health_routes;
