use std::env;

use booksearch_core::config::Config;
use booksearch_core::BookService;
use booksearch_text::TantivyEngine;

fn main() -> anyhow::Result<()> {
    booksearch_server::init_tracing("warn");
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [--genre <genre>]", args[0]);
        eprintln!("Example: {} 'desert AND planet' --genre scifi", args[0]);
        std::process::exit(1);
    }
    let query_text = &args[1];
    let genre = args.iter().position(|a| a == "--genre").and_then(|i| args.get(i + 1)).map(String::as_str);

    let config = Config::load()?;
    let settings = config.settings()?;
    let index_dir = config.index_dir()?;
    println!("🔍 booksearch-search-only\n========================");
    println!("Query: {}", query_text); if let Some(g) = genre { println!("Genre: {}", g); }
    println!("Index directory: {}", index_dir.display());

    let service = BookService::new(TantivyEngine::open_read_only(&index_dir, &settings)?, settings.search.options());
    let books = service.search_by(genre, Some(query_text.as_str()))?;
    println!("\n🔍 Found {} results for: \"{}\"", books.len(), query_text);
    for (i, book) in books.iter().enumerate() {
        println!("\n  {}. id={}  title={}  author={}  genre={}", i + 1, book.id, book.title, book.author, book.genre);
        println!("     📝 {}", book.description);
    }
    println!("\n📊 Genre counts:");
    let mut counts: Vec<_> = service.count_by_genre()?.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (genre, count) in counts { println!("  {}: {} books", genre, count); }
    Ok(())
}
