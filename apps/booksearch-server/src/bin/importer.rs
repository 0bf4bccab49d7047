use std::{env, path::PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use booksearch_core::config::{resolve_with_base, Config};
use booksearch_core::BookService;
use booksearch_server::import::import_dir;
use booksearch_server::init_tracing;
use booksearch_text::TantivyEngine;

fn main() -> anyhow::Result<()> {
    init_tracing("warn");
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let args: Vec<String> = env::args().skip(1).collect();
    let mut fresh = false; let mut data_dir = None; let mut batch_size: Option<usize> = None;
    let mut i = 0; while i < args.len() { match args[i].as_str() {
        "--fresh" | "-f" => fresh = true,
        "--batch" => { match args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) { Some(n) => { batch_size = Some(n); i += 1; } None => { eprintln!("Error: --batch requires a number"); std::process::exit(1); } } }
        _ if !args[i].starts_with('-') => data_dir = Some(PathBuf::from(&args[i])), _ => {} } i += 1; }
    let data_dir = data_dir.unwrap_or_else(|| { let dir: String = config.get("import.data_dir").unwrap_or_else(|_| "./data/books".to_string()); resolve_with_base(config.base_dir(), dir) });
    let batch_size = batch_size.unwrap_or_else(|| config.get("import.batch_size").unwrap_or(500));
    let index_dir = config.index_dir()?;

    println!("Book Importer\n=============");
    println!("Data directory: {}", data_dir.display());
    println!("Index directory: {}", index_dir.display());
    if fresh { println!("⚠️  Wiping existing index (--fresh flag)"); }

    let engine = if fresh { TantivyEngine::open_fresh(&index_dir, &settings)? } else { TantivyEngine::open(&index_dir, &settings)? };
    let service = BookService::new(engine, settings.search.options());

    let pb = ProgressBar::new(0);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?.progress_chars("#>-"));
    let report = import_dir(&service, &data_dir, batch_size, &pb)?;

    println!("\n✅ Import completed successfully!");
    println!("📊 {} books from {} files in {} batches", report.books, report.files, report.batches);
    println!("📚 Index now holds {} documents", service.engine().num_docs());
    println!("\n💡 To search, use: cargo run --bin booksearch-search-only '<query>' [--genre <genre>]");
    Ok(())
}
