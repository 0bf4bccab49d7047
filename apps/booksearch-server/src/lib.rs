//! booksearch-server
//!
//! HTTP routes over `BookService` plus the bulk import used by the
//! `booksearch-import` binary.

pub mod error;
pub mod import;
pub mod routes;

pub use error::ApiError;
pub use routes::router;

/// Installs the fmt subscriber; `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
