//! Bulk import of book files into an engine.
//!
//! `.json` files hold one book or an array of books; `.jsonl` files hold one
//! book per line. Books are saved in batches through `save_books`.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};

use booksearch_core::traits::SearchEngine;
use booksearch_core::{Book, BookService};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub files: usize,
    pub books: usize,
    pub batches: usize,
}

pub fn list_book_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")))
        .collect();
    files.sort();
    files
}

pub fn read_books(path: &Path) -> Result<Vec<Book>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        return content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("{}:{}: invalid book", path.display(), n + 1))
            })
            .collect();
    }
    let value: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    let books = if value.is_array() {
        serde_json::from_value(value)
    } else {
        serde_json::from_value(value).map(|book| vec![book])
    };
    books.with_context(|| format!("{}: invalid book", path.display()))
}

pub fn import_dir<E: SearchEngine>(
    service: &BookService<E>,
    root: &Path,
    batch_size: usize,
    progress: &ProgressBar,
) -> Result<ImportReport> {
    let files = list_book_files(root);
    let batch_size = batch_size.max(1);
    progress.set_length(files.len() as u64);

    let mut report = ImportReport::default();
    let mut pending: Vec<Book> = Vec::with_capacity(batch_size);
    for file in &files {
        progress.set_message(file.display().to_string());
        pending.extend(read_books(file)?);
        report.files += 1;
        while pending.len() >= batch_size {
            let batch: Vec<Book> = pending.drain(..batch_size).collect();
            report.books += service.save_books(&batch)?.len();
            report.batches += 1;
        }
        progress.inc(1);
    }
    if !pending.is_empty() {
        report.books += service.save_books(&pending)?.len();
        report.batches += 1;
    }
    progress.finish_with_message("import complete");
    tracing::info!(files = report.files, books = report.books, batches = report.batches, "import done");
    Ok(report)
}
