//! Turns raw engine output into typed results.
//!
//! Hits keep the order the engine returned them in; nothing here sorts.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traits::RawDocument;
use crate::types::{Book, GenreCounts};

/// What to do with a hit whose payload does not decode into a `Book`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Fail the whole batch on the first bad hit.
    #[default]
    Strict,
    /// Drop bad hits with a warning and return the rest.
    Skip,
}

pub fn map_hits<I>(docs: I, policy: DecodePolicy) -> Result<Vec<Book>>
where
    I: IntoIterator<Item = RawDocument>,
{
    let docs = docs.into_iter();
    let mut books = Vec::with_capacity(docs.size_hint().0);
    for (index, doc) in docs.enumerate() {
        match serde_json::from_value::<Book>(doc) {
            Ok(book) => books.push(book),
            Err(source) => match policy {
                DecodePolicy::Strict => return Err(Error::InvalidDocumentPayload { index, source }),
                DecodePolicy::Skip => {
                    tracing::warn!(index, error = %source, "skipping undecodable hit");
                }
            },
        }
    }
    Ok(books)
}

/// Duplicate labels should not occur; if they do the last one wins.
pub fn map_buckets<I>(buckets: I) -> GenreCounts
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut counts = GenreCounts::new();
    for (label, count) in buckets {
        counts.insert(label, count);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, title: &str) -> RawDocument {
        json!({ "id": id, "title": title, "author": "a", "genre": "g", "description": "d" })
    }

    #[test]
    fn preserves_engine_order() {
        let books = map_hits(vec![doc("b", "Zeta"), doc("a", "Alpha")], DecodePolicy::Strict).unwrap();
        let ids: Vec<_> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn strict_policy_fails_whole_batch() {
        let docs = vec![doc("1", "ok"), json!({ "id": "2", "title": 17 }), doc("3", "ok")];
        match map_hits(docs, DecodePolicy::Strict) {
            Err(Error::InvalidDocumentPayload { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected payload error, got {other:?}"),
        }
    }

    #[test]
    fn non_object_hits_fail_the_batch() {
        for bad in [json!([]), json!(["9", "Dune", "Herbert", "scifi", "desert"]), json!(42), json!(null)] {
            match map_hits(vec![doc("1", "ok"), bad.clone()], DecodePolicy::Strict) {
                Err(Error::InvalidDocumentPayload { index, .. }) => assert_eq!(index, 1),
                other => panic!("{bad} should fail the batch, got {other:?}"),
            }
        }
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let raw = json!({ "id": "1", "title": "Dune", "author": null, "genre": "scifi", "description": null });
        let books = map_hits(vec![raw], DecodePolicy::Strict).unwrap();
        assert_eq!(books, vec![Book::new("1", "Dune", "", "scifi", "")]);
    }

    #[test]
    fn skip_policy_keeps_good_hits_in_order() {
        let docs = vec![doc("1", "ok"), json!("not an object"), doc("3", "ok")];
        let books = map_hits(docs, DecodePolicy::Skip).unwrap();
        let ids: Vec<_> = books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut raw = doc("1", "Dune");
        raw["rating"] = json!(4.5);
        let books = map_hits(vec![raw], DecodePolicy::Strict).unwrap();
        assert_eq!(books[0], Book::new("1", "Dune", "a", "g", "d"));
    }

    #[test]
    fn empty_input_maps_to_empty_output() {
        assert!(map_hits(Vec::new(), DecodePolicy::Strict).unwrap().is_empty());
        assert!(map_buckets(Vec::new()).is_empty());
    }

    #[test]
    fn buckets_become_counts() {
        let counts = map_buckets(vec![("fiction".to_string(), 5), ("drama".to_string(), 2)]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["fiction"], 5);
        assert_eq!(counts["drama"], 2);
    }

    #[test]
    fn duplicate_bucket_label_last_write_wins() {
        let counts = map_buckets(vec![("x".to_string(), 1), ("x".to_string(), 2)]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["x"], 2);
    }
}
