use std::path::Path;
use std::sync::Mutex;

use tantivy::directory::MmapDirectory;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use booksearch_core::config::Settings;
use booksearch_core::query::SearchSpec;
use booksearch_core::traits::{RawDocument, SearchEngine};
use booksearch_core::{Book, Error, Result};

use crate::tantivy_utils::{build_schema, register_tokenizer, BookFields};

/// An embedded tantivy index holding books.
///
/// Writes go through a single writer and are committed per call; the reader
/// is reloaded after each commit so the next query sees them. An engine
/// opened read-only holds no writer and so never takes the directory lock.
pub struct TantivyEngine {
	pub(crate) index: Index,
	pub(crate) reader: IndexReader,
	writer: Option<Mutex<IndexWriter>>,
	pub(crate) fields: BookFields,
	pub(crate) max_hits: usize,
	pub(crate) max_buckets: u32,
}

impl TantivyEngine {
	/// Opens the index in `index_dir`, creating it if missing.
	pub fn open(index_dir: &Path, settings: &Settings) -> Result<Self> {
		std::fs::create_dir_all(index_dir).map_err(Error::engine)?;
		let directory = MmapDirectory::open(index_dir).map_err(Error::engine)?;
		let index = Index::open_or_create(directory, build_schema()).map_err(Error::engine)?;
		tracing::info!(dir = %index_dir.display(), "opened book index");
		Self::from_index(index, settings, true)
	}

	/// Opens an existing index for searching only; saves are refused. Can run
	/// next to another process that writes to the same directory.
	pub fn open_read_only(index_dir: &Path, settings: &Settings) -> Result<Self> {
		let directory = MmapDirectory::open(index_dir).map_err(Error::engine)?;
		let index = Index::open(directory).map_err(Error::engine)?;
		tracing::info!(dir = %index_dir.display(), "opened book index read-only");
		Self::from_index(index, settings, false)
	}

	/// Wipes `index_dir` and starts an empty index there.
	pub fn open_fresh(index_dir: &Path, settings: &Settings) -> Result<Self> {
		if index_dir.exists() { std::fs::remove_dir_all(index_dir).map_err(Error::engine)?; }
		Self::open(index_dir, settings)
	}

	pub fn in_memory(settings: &Settings) -> Result<Self> {
		Self::from_index(Index::create_in_ram(build_schema()), settings, true)
	}

	fn from_index(index: Index, settings: &Settings, writable: bool) -> Result<Self> {
		register_tokenizer(&index);
		let fields = BookFields::from_schema(&index.schema()).map_err(Error::engine)?;
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into().map_err(Error::engine)?;
		let writer = if writable { Some(Mutex::new(index.writer(settings.index.writer_heap_bytes).map_err(Error::engine)?)) } else { None };
		Ok(Self {
			index,
			reader,
			writer,
			fields,
			max_hits: settings.search.max_hits.max(1),
			max_buckets: settings.search.max_buckets.max(1),
		})
	}

	/// Number of live documents visible to readers.
	pub fn num_docs(&self) -> u64 {
		self.reader.searcher().num_docs()
	}

	fn to_document(&self, book: &Book) -> Result<TantivyDocument> {
		let source = serde_json::to_string(book).map_err(Error::engine)?;
		Ok(doc!(
			self.fields.id => book.id.clone(),
			self.fields.title => book.title.clone(),
			self.fields.author => book.author.clone(),
			self.fields.genre => book.genre.clone(),
			self.fields.description => book.description.clone(),
			self.fields.source => source,
		))
	}

	fn upsert(&self, books: Vec<Book>) -> Result<Vec<Book>> {
		if books.is_empty() { return Ok(books); }
		let docs = books.iter().map(|b| self.to_document(b)).collect::<Result<Vec<_>>>()?;
		let writer = self.writer.as_ref().ok_or_else(|| Error::engine("index opened read-only"))?;
		let mut writer = writer.lock().map_err(|_| Error::engine("index writer lock poisoned"))?;
		// a later delete also removes earlier adds of the same id in this batch
		let written = (|| -> tantivy::Result<()> {
			for (book, doc) in books.iter().zip(docs) {
				writer.delete_term(Term::from_field_text(self.fields.id, &book.id));
				writer.add_document(doc)?;
			}
			writer.commit()?;
			Ok(())
		})();
		if let Err(e) = written {
			if let Err(rollback) = writer.rollback() { tracing::warn!(error = %rollback, "rollback after failed write also failed"); }
			return Err(Error::engine(e));
		}
		drop(writer);
		self.reader.reload().map_err(Error::engine)?;
		tracing::debug!(count = books.len(), "committed books");
		Ok(books)
	}
}

fn assign_id(book: &Book) -> Book {
	if book.has_id() { book.clone() } else { book.clone().with_id(uuid::Uuid::new_v4().to_string()) }
}

impl SearchEngine for TantivyEngine {
	fn execute(&self, spec: &SearchSpec) -> Result<Vec<RawDocument>> {
		self.search_hits(spec)
	}

	fn execute_aggregation(&self, spec: &SearchSpec) -> Result<Vec<(String, u64)>> {
		self.term_buckets(spec)
	}

	fn save(&self, book: &Book) -> Result<Book> {
		self.upsert(vec![assign_id(book)])?.pop().ok_or_else(|| Error::engine("save returned no document"))
	}

	fn save_all(&self, books: &[Book]) -> Result<Vec<Book>> {
		self.upsert(books.iter().map(assign_id).collect())
	}
}
