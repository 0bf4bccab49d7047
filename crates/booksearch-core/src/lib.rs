//! booksearch-core
//!
//! Book record schema, search specifications and the query builder that
//! produces them, the result mapper that turns raw engine hits back into
//! books, and the `SearchEngine` boundary the adapters implement.

#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod mapper;
pub mod query;
pub mod service;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use mapper::DecodePolicy;
pub use query::{CombinePolicy, QueryBuilder, SearchSpec};
pub use service::{BookService, SearchOptions};
pub use types::{Book, BookField, FieldKind, GenreCounts};
