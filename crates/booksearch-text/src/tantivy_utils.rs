use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

use booksearch_core::BookField;

pub const TEXT_TOKENIZER: &str = "text_with_stopwords";

/// Stored JSON of the whole book; returned as the raw hit.
pub const SOURCE_FIELD: &str = "source";

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	schema_builder.add_text_field(BookField::Id.name(), STRING | STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TEXT_TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	schema_builder.add_text_field(BookField::Title.name(), text_options.clone());
	schema_builder.add_text_field(BookField::Description.name(), text_options);
	schema_builder.add_text_field(BookField::Author.name(), STRING | STORED);
	// fast column backs the terms aggregation
	schema_builder.add_text_field(BookField::Genre.name(), STRING.set_stored().set_fast(None));
	schema_builder.add_text_field(SOURCE_FIELD, STORED);
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
	];
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(TEXT_TOKENIZER, tokenizer);
}

/// Resolved schema fields, one per book field plus the stored source.
#[derive(Debug, Clone, Copy)]
pub struct BookFields {
	pub id: Field,
	pub title: Field,
	pub author: Field,
	pub genre: Field,
	pub description: Field,
	pub source: Field,
}

impl BookFields {
	pub fn from_schema(schema: &Schema) -> tantivy::Result<Self> {
		Ok(Self {
			id: schema.get_field(BookField::Id.name())?,
			title: schema.get_field(BookField::Title.name())?,
			author: schema.get_field(BookField::Author.name())?,
			genre: schema.get_field(BookField::Genre.name())?,
			description: schema.get_field(BookField::Description.name())?,
			source: schema.get_field(SOURCE_FIELD)?,
		})
	}

	pub fn get(&self, field: BookField) -> Field {
		match field {
			BookField::Id => self.id,
			BookField::Title => self.title,
			BookField::Author => self.author,
			BookField::Genre => self.genre,
			BookField::Description => self.description,
		}
	}
}
