//! Domain types shared by the query builder, the mapper and the engines.

use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type BookId = String;

/// Genre label -> number of books carrying it.
pub type GenreCounts = HashMap<String, u64>;

/// A book as stored in the index.
///
/// Saving is an upsert keyed by `id`; a book is never patched in place. An
/// empty `id` asks the engine to assign one. Only a JSON object decodes into a
/// book: unknown fields are ignored, missing or `null` ones become empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
}

impl Book {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            description: description.into(),
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        Self { id: id.into(), ..self }
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct BookRecord {
    #[serde(deserialize_with = "null_as_empty")]
    id: String,
    #[serde(deserialize_with = "null_as_empty")]
    title: String,
    #[serde(deserialize_with = "null_as_empty")]
    author: String,
    #[serde(deserialize_with = "null_as_empty")]
    genre: String,
    #[serde(deserialize_with = "null_as_empty")]
    description: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

struct BookVisitor;

impl<'de> Visitor<'de> for BookVisitor {
    type Value = Book;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a book object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Book, A::Error> {
        let BookRecord { id, title, author, genre, description } =
            BookRecord::deserialize(MapAccessDeserializer::new(map))?;
        Ok(Book { id, title, author, genre, description })
    }
}

// Positional (array) input would otherwise fill fields by order.
impl<'de> Deserialize<'de> for Book {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BookVisitor)
    }
}

/// How the engine indexes a field, which decides the operators allowed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Untokenized; equality filters and grouping.
    ExactMatch,
    /// Tokenized and scored by free-text queries.
    FullText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookField {
    Id,
    Title,
    Author,
    Genre,
    Description,
}

impl BookField {
    pub const ALL: [BookField; 5] = [
        BookField::Id,
        BookField::Title,
        BookField::Author,
        BookField::Genre,
        BookField::Description,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BookField::Id => "id",
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Genre => "genre",
            BookField::Description => "description",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            BookField::Id | BookField::Author | BookField::Genre => FieldKind::ExactMatch,
            BookField::Title | BookField::Description => FieldKind::FullText,
        }
    }

    pub fn is_exact_match(self) -> bool {
        self.kind() == FieldKind::ExactMatch
    }

    pub fn is_full_text(self) -> bool {
        self.kind() == FieldKind::FullText
    }
}

impl fmt::Display for BookField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
