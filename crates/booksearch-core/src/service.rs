//! `BookService` wires the query builder, an injected engine and the mapper
//! together. It holds no state of its own beyond its options.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mapper::{map_buckets, map_hits, DecodePolicy};
use crate::query::{CombinePolicy, QueryBuilder, SearchSpec};
use crate::traits::SearchEngine;
use crate::types::{Book, GenreCounts};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub combine: CombinePolicy,
    pub decode: DecodePolicy,
}

pub struct BookService<E> {
    engine: E,
    builder: QueryBuilder,
    decode: DecodePolicy,
}

impl<E: SearchEngine> BookService<E> {
    pub fn new(engine: E, options: SearchOptions) -> Self {
        Self { engine, builder: QueryBuilder::new(options.combine), decode: options.decode }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn save_book(&self, book: &Book) -> Result<Book> {
        tracing::debug!(id = %book.id, "saving book");
        self.engine.save(book)
    }

    pub fn save_books(&self, books: &[Book]) -> Result<Vec<Book>> {
        tracing::debug!(count = books.len(), "saving books in bulk");
        self.engine.save_all(books)
    }

    /// Free-text search over title and description.
    pub fn search_books(&self, query: &str) -> Result<Vec<Book>> {
        self.run(self.builder.full_text(query))
    }

    /// Combined search; see `QueryBuilder::build` for precedence.
    pub fn search_by(&self, genre: Option<&str>, query: Option<&str>) -> Result<Vec<Book>> {
        self.run(self.builder.build(genre, query))
    }

    pub fn count_by_genre(&self) -> Result<GenreCounts> {
        let spec = self.builder.genre_counts();
        spec.validate()?;
        let buckets = self.engine.execute_aggregation(&spec)?;
        tracing::debug!(buckets = buckets.len(), "genre aggregation done");
        Ok(map_buckets(buckets))
    }

    fn run(&self, spec: SearchSpec) -> Result<Vec<Book>> {
        spec.validate()?;
        tracing::debug!(?spec, "executing search");
        let hits = self.engine.execute(&spec)?;
        map_hits(hits, self.decode)
    }
}
