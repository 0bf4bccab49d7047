//! Search specifications and the builder that derives them from request
//! parameters.
//!
//! The builder never talks to an engine and never inspects query syntax:
//! free text is handed to the engine's query-string operator verbatim.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::BookField;

/// Name under which the genre aggregation is requested.
pub const GENRE_AGGREGATION: &str = "genre_agg";

/// Full-text fields scored by free-text queries.
pub const TEXT_FIELDS: [BookField; 2] = [BookField::Title, BookField::Description];

/// A transient description of one query or aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchSpec {
    /// Equality on an exact-match field.
    Term { field: BookField, value: String },
    /// Engine query-string syntax, scored across full-text fields.
    FullText { query: String, fields: Vec<BookField> },
    MatchAll,
    /// Every part must match. Only built under `CombinePolicy::Conjunction`.
    Conjunction(Vec<SearchSpec>),
    /// Group the whole corpus by an exact-match field and count.
    GroupBy { field: BookField, name: String },
}

impl SearchSpec {
    pub fn term(field: BookField, value: impl Into<String>) -> Self {
        SearchSpec::Term { field, value: value.into() }
    }

    pub fn full_text(query: impl Into<String>) -> Self {
        SearchSpec::FullText { query: query.into(), fields: TEXT_FIELDS.to_vec() }
    }

    pub fn is_aggregation(&self) -> bool {
        matches!(self, SearchSpec::GroupBy { .. })
    }

    /// Checks operator/field legality against the schema's field kinds.
    pub fn validate(&self) -> Result<()> {
        match self {
            SearchSpec::Term { field, .. } if !field.is_exact_match() => Err(Error::InvalidQuery(
                format!("term filter on full-text field '{field}'"),
            )),
            SearchSpec::GroupBy { field, .. } if !field.is_exact_match() => Err(
                Error::InvalidQuery(format!("group-by on full-text field '{field}'")),
            ),
            SearchSpec::FullText { fields, .. } => {
                if fields.is_empty() {
                    return Err(Error::InvalidQuery("full-text query without fields".into()));
                }
                match fields.iter().find(|f| !f.is_full_text()) {
                    Some(f) => Err(Error::InvalidQuery(format!(
                        "full-text query on exact-match field '{f}'"
                    ))),
                    None => Ok(()),
                }
            }
            SearchSpec::Conjunction(parts) => {
                if parts.is_empty() {
                    return Err(Error::InvalidQuery("empty conjunction".into()));
                }
                for part in parts {
                    if part.is_aggregation() {
                        return Err(Error::InvalidQuery("group-by inside a conjunction".into()));
                    }
                    part.validate()?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// What `QueryBuilder::build` does when both genre and free text are given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinePolicy {
    /// Genre wins and the free text is dropped.
    #[default]
    GenreFirst,
    /// Both filters apply.
    Conjunction,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    combine: CombinePolicy,
}

impl QueryBuilder {
    pub fn new(combine: CombinePolicy) -> Self {
        Self { combine }
    }

    /// Combined search: genre filter, else free text, else everything.
    pub fn build(&self, genre: Option<&str>, query: Option<&str>) -> SearchSpec {
        match (present(genre), present(query)) {
            (Some(genre), Some(query)) if self.combine == CombinePolicy::Conjunction => {
                SearchSpec::Conjunction(vec![
                    SearchSpec::term(BookField::Genre, genre),
                    SearchSpec::full_text(query),
                ])
            }
            (Some(genre), _) => SearchSpec::term(BookField::Genre, genre),
            (None, Some(query)) => SearchSpec::full_text(query),
            (None, None) => SearchSpec::MatchAll,
        }
    }

    /// Free-text only. An empty string is forwarded as is.
    pub fn full_text(&self, query: &str) -> SearchSpec {
        SearchSpec::full_text(query)
    }

    pub fn genre_counts(&self) -> SearchSpec {
        SearchSpec::GroupBy { field: BookField::Genre, name: GENRE_AGGREGATION.to_string() }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
