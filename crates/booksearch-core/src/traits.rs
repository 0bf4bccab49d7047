use crate::error::Result;
use crate::query::SearchSpec;
use crate::types::Book;

/// A hit's stored payload, as the engine returned it.
pub type RawDocument = serde_json::Value;

/// The engine boundary. Implementations own storage, ranking, aggregation and
/// id uniqueness; callers pass them in explicitly.
pub trait SearchEngine: Send + Sync {
    /// Hits for a query spec, best first.
    fn execute(&self, spec: &SearchSpec) -> Result<Vec<RawDocument>>;
    /// `(label, count)` buckets for a `GroupBy` spec.
    fn execute_aggregation(&self, spec: &SearchSpec) -> Result<Vec<(String, u64)>>;
    /// Upsert by id; returns the stored book (with an assigned id if it had none).
    fn save(&self, book: &Book) -> Result<Book>;
    /// Upserts a batch. No atomicity across the batch is promised.
    fn save_all(&self, books: &[Book]) -> Result<Vec<Book>>;
}

