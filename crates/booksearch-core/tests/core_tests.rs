use std::sync::Mutex;

use serde_json::json;

use booksearch_core::traits::{RawDocument, SearchEngine};
use booksearch_core::types::BookField;
use booksearch_core::{
    Book, BookService, CombinePolicy, DecodePolicy, Error, Result, SearchOptions, SearchSpec,
};

/// Keeps books in insertion order and evaluates specs naively.
#[derive(Default)]
struct FakeEngine {
    books: Mutex<Vec<Book>>,
    executed: Mutex<Vec<SearchSpec>>,
}

fn field_value(book: &Book, field: BookField) -> &str {
    match field {
        BookField::Id => &book.id,
        BookField::Title => &book.title,
        BookField::Author => &book.author,
        BookField::Genre => &book.genre,
        BookField::Description => &book.description,
    }
}

fn matches(spec: &SearchSpec, book: &Book) -> bool {
    match spec {
        SearchSpec::Term { field, value } => field_value(book, *field) == value,
        SearchSpec::FullText { query, fields } => {
            let q = query.to_lowercase();
            q.split_whitespace().any(|word| {
                fields.iter().any(|f| field_value(book, *f).to_lowercase().contains(word))
            })
        }
        SearchSpec::MatchAll => true,
        SearchSpec::Conjunction(parts) => parts.iter().all(|p| matches(p, book)),
        SearchSpec::GroupBy { .. } => false,
    }
}

impl SearchEngine for FakeEngine {
    fn execute(&self, spec: &SearchSpec) -> Result<Vec<RawDocument>> {
        self.executed.lock().unwrap().push(spec.clone());
        let books = self.books.lock().unwrap();
        Ok(books
            .iter()
            .filter(|b| matches(spec, b))
            .map(|b| serde_json::to_value(b).unwrap())
            .collect())
    }

    fn execute_aggregation(&self, _spec: &SearchSpec) -> Result<Vec<(String, u64)>> {
        let books = self.books.lock().unwrap();
        let mut buckets: Vec<(String, u64)> = Vec::new();
        for b in books.iter() {
            match buckets.iter_mut().find(|(g, _)| *g == b.genre) {
                Some((_, n)) => *n += 1,
                None => buckets.push((b.genre.clone(), 1)),
            }
        }
        Ok(buckets)
    }

    fn save(&self, book: &Book) -> Result<Book> {
        let mut books = self.books.lock().unwrap();
        let stored = if book.has_id() { book.clone() } else { book.clone().with_id(format!("gen-{}", books.len())) };
        match books.iter_mut().find(|b| b.id == stored.id) {
            Some(existing) => *existing = stored.clone(),
            None => books.push(stored.clone()),
        }
        Ok(stored)
    }

    fn save_all(&self, books: &[Book]) -> Result<Vec<Book>> {
        books.iter().map(|b| self.save(b)).collect()
    }
}

/// Returns the same canned hits for every query.
struct CannedEngine(Vec<RawDocument>);

impl SearchEngine for CannedEngine {
    fn execute(&self, _spec: &SearchSpec) -> Result<Vec<RawDocument>> {
        Ok(self.0.clone())
    }

    fn execute_aggregation(&self, _spec: &SearchSpec) -> Result<Vec<(String, u64)>> {
        Ok(vec![("x".to_string(), 1), ("y".to_string(), 4), ("x".to_string(), 2)])
    }

    fn save(&self, _book: &Book) -> Result<Book> {
        Err(Error::engine("read-only"))
    }

    fn save_all(&self, _books: &[Book]) -> Result<Vec<Book>> {
        Err(Error::engine("read-only"))
    }
}

fn dune() -> Book {
    Book::new("1", "Dune", "Herbert", "scifi", "desert planet")
}

fn library() -> BookService<FakeEngine> {
    let service = BookService::new(FakeEngine::default(), SearchOptions::default());
    service
        .save_books(&[
            dune(),
            Book::new("2", "The Hobbit", "Tolkien", "fantasy", "a journey there and back"),
            Book::new("3", "Foundation", "Asimov", "scifi", "galactic empire falls"),
        ])
        .unwrap();
    service
}

#[test]
fn save_then_filter_by_genre() {
    let service = BookService::new(FakeEngine::default(), SearchOptions::default());
    let saved = service.save_book(&dune()).unwrap();
    assert_eq!(saved, dune());

    assert_eq!(service.search_by(Some("scifi"), None).unwrap(), vec![dune()]);
    assert!(service.search_by(Some("fantasy"), None).unwrap().is_empty());
}

#[test]
fn combined_search_precedence() {
    let service = library();
    let by_genre = service.search_by(Some("scifi"), Some("hobbit")).unwrap();
    let ids: Vec<_> = by_genre.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"], "free text is dropped when a genre is given");

    let by_text = service.search_by(Some(""), Some("hobbit")).unwrap();
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].id, "2");

    assert_eq!(service.search_by(None, None).unwrap().len(), 3);
    assert_eq!(service.search_by(Some(""), Some("")).unwrap().len(), 3);
}

#[test]
fn conjunction_policy_filters_on_both() {
    let options = SearchOptions { combine: CombinePolicy::Conjunction, ..SearchOptions::default() };
    let service = BookService::new(FakeEngine::default(), options);
    service.save_books(&[dune(), Book::new("3", "Foundation", "Asimov", "scifi", "empire")]).unwrap();

    let hits = service.search_by(Some("scifi"), Some("empire")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "3");
}

#[test]
fn free_text_endpoint_targets_title_and_description() {
    let service = library();
    let hits = service.search_books("galactic").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Foundation");

    let executed = service.engine().executed.lock().unwrap();
    match executed.last() {
        Some(SearchSpec::FullText { fields, .. }) => {
            assert_eq!(fields, &vec![BookField::Title, BookField::Description])
        }
        other => panic!("unexpected spec {other:?}"),
    }
}

#[test]
fn upsert_replaces_by_id() {
    let service = library();
    service.save_book(&Book::new("1", "Dune Messiah", "Herbert", "scifi", "sequel")).unwrap();
    let all = service.search_by(None, None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].title, "Dune Messiah");
}

#[test]
fn genre_counts_from_engine_buckets() {
    let counts = library().count_by_genre().unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts["scifi"], 2);
    assert_eq!(counts["fantasy"], 1);
}

#[test]
fn duplicate_buckets_last_write_wins() {
    let service = BookService::new(CannedEngine(vec![]), SearchOptions::default());
    let counts = service.count_by_genre().unwrap();
    assert_eq!(counts["x"], 2);
    assert_eq!(counts["y"], 4);
}

#[test]
fn malformed_hit_fails_the_batch_by_default() {
    let hits = vec![
        serde_json::to_value(dune()).unwrap(),
        json!({ "id": "2", "genre": 12 }),
    ];
    let service = BookService::new(CannedEngine(hits), SearchOptions::default());
    assert!(matches!(
        service.search_by(None, None),
        Err(Error::InvalidDocumentPayload { index: 1, .. })
    ));
}

#[test]
fn malformed_hit_is_dropped_under_skip_policy() {
    let hits = vec![
        json!(null),
        serde_json::to_value(dune()).unwrap(),
        json!({ "id": "2", "genre": 12 }),
    ];
    let options = SearchOptions { decode: DecodePolicy::Skip, ..SearchOptions::default() };
    let service = BookService::new(CannedEngine(hits), options);
    assert_eq!(service.search_by(None, None).unwrap(), vec![dune()]);
}

#[test]
fn engine_failures_propagate_unchanged() {
    let service = BookService::new(CannedEngine(vec![]), SearchOptions::default());
    match service.save_book(&dune()) {
        Err(Error::EngineCommunication(msg)) => assert_eq!(msg, "read-only"),
        other => panic!("expected engine failure, got {other:?}"),
    }
}
