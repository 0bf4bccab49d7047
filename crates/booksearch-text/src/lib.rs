//! booksearch-text
//!
//! Tantivy-backed `SearchEngine`: schema and analyzers in `tantivy_utils`,
//! upserts in `index`, query translation and aggregation in `search`.

pub mod index;
pub mod search;
pub mod tantivy_utils;

pub use index::TantivyEngine;
