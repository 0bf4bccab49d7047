use serde_json::json;
use tantivy::aggregation::agg_req::Aggregations;
use tantivy::aggregation::AggregationCollector;
use tantivy::collector::TopDocs;
use tantivy::query::{AllQuery, BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{TantivyDocument, Term};

use booksearch_core::query::SearchSpec;
use booksearch_core::traits::RawDocument;
use booksearch_core::{Error, Result};

use crate::index::TantivyEngine;

impl TantivyEngine {
	/// Translates a query spec into a tantivy query.
	pub fn to_query(&self, spec: &SearchSpec) -> Result<Box<dyn Query>> {
		match spec {
			SearchSpec::Term { field, value } => {
				let term = Term::from_field_text(self.fields.get(*field), value);
				Ok(Box::new(TermQuery::new(term, IndexRecordOption::Basic)))
			}
			SearchSpec::FullText { query, fields } => {
				let default_fields = fields.iter().map(|f| self.fields.get(*f)).collect();
				let qp = QueryParser::for_index(&self.index, default_fields);
				qp.parse_query(query).map_err(|e| Error::InvalidQuery(e.to_string()))
			}
			SearchSpec::MatchAll => Ok(Box::new(AllQuery)),
			SearchSpec::Conjunction(parts) => {
				let clauses = parts.iter().map(|p| Ok((Occur::Must, self.to_query(p)?))).collect::<Result<Vec<_>>>()?;
				Ok(Box::new(BooleanQuery::new(clauses)))
			}
			SearchSpec::GroupBy { .. } => Err(Error::InvalidQuery("group-by specs run through execute_aggregation".into())),
		}
	}

	pub(crate) fn search_hits(&self, spec: &SearchSpec) -> Result<Vec<RawDocument>> {
		let query = self.to_query(spec)?;
		let searcher = self.reader.searcher();
		let top_docs = searcher.search(&*query, &TopDocs::with_limit(self.max_hits)).map_err(Error::engine)?;
		if top_docs.len() == self.max_hits {
			tracing::debug!(max_hits = self.max_hits, "hits truncated at max_hits; more documents may match");
		}
		let mut hits = Vec::with_capacity(top_docs.len());
		for (_score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr).map_err(Error::engine)?;
			hits.push(self.raw_source(&doc));
		}
		tracing::debug!(hits = hits.len(), "search finished");
		Ok(hits)
	}

	/// The stored JSON of a hit. Unparseable or missing sources come back as
	/// `null` and are left to the mapper's decode policy.
	fn raw_source(&self, doc: &TantivyDocument) -> RawDocument {
		let Some(source) = doc.get_first(self.fields.source).and_then(|v| v.as_str()) else {
			tracing::warn!("hit without stored source");
			return RawDocument::Null;
		};
		serde_json::from_str(source).unwrap_or_else(|e| {
			tracing::warn!(error = %e, "stored source is not valid JSON");
			RawDocument::Null
		})
	}

	pub(crate) fn term_buckets(&self, spec: &SearchSpec) -> Result<Vec<(String, u64)>> {
		let SearchSpec::GroupBy { field, name } = spec else {
			return Err(Error::InvalidQuery("aggregation requires a group-by spec".into()));
		};
		let mut request = serde_json::Map::new();
		request.insert(name.clone(), json!({ "terms": { "field": field.name(), "size": self.max_buckets } }));
		let aggs: Aggregations = serde_json::from_value(RawDocument::Object(request)).map_err(|e| Error::InvalidQuery(e.to_string()))?;
		let collector = AggregationCollector::from_aggs(aggs, Default::default());
		let searcher = self.reader.searcher();
		let results = searcher.search(&AllQuery, &collector).map_err(Error::engine)?;
		let results = serde_json::to_value(&results).map_err(Error::engine)?;
		parse_buckets(&results[name.as_str()])
	}
}

/// Reads `(key, doc_count)` pairs out of a terms aggregation result.
fn parse_buckets(result: &serde_json::Value) -> Result<Vec<(String, u64)>> {
	if result.is_null() { return Ok(Vec::new()); }
	let buckets = result.get("buckets").and_then(|b| b.as_array()).ok_or_else(|| Error::engine("terms aggregation returned no buckets"))?;
	buckets
		.iter()
		.map(|bucket| {
			let key = match bucket.get("key") {
				Some(serde_json::Value::String(s)) => s.clone(),
				Some(other) => other.to_string(),
				None => return Err(Error::engine("bucket without key")),
			};
			let count = bucket.get("doc_count").and_then(|c| c.as_u64()).ok_or_else(|| Error::engine("bucket without doc_count"))?;
			Ok((key, count))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_terms_buckets_in_order() {
		let result = json!({
			"buckets": [ { "key": "scifi", "doc_count": 3 }, { "key": "drama", "doc_count": 1 } ],
			"sum_other_doc_count": 0,
			"doc_count_error_upper_bound": 0
		});
		assert_eq!(parse_buckets(&result).unwrap(), vec![("scifi".to_string(), 3), ("drama".to_string(), 1)]);
	}

	#[test]
	fn missing_aggregation_is_empty() {
		assert!(parse_buckets(&serde_json::Value::Null).unwrap().is_empty());
		assert!(parse_buckets(&json!({ "value": 1 })).is_err());
	}
}
