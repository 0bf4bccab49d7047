use std::sync::Arc;

use booksearch_core::config::Config;
use booksearch_core::BookService;
use booksearch_server::{init_tracing, router};
use booksearch_text::TantivyEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info,tower_http=debug");

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let index_dir = config.index_dir()?;

    let engine = TantivyEngine::open(&index_dir, &settings)?;
    tracing::info!(docs = engine.num_docs(), combine = ?settings.search.combine, decode = ?settings.search.decode, "engine ready");
    let service = Arc::new(BookService::new(engine, settings.search.options()));

    let addr = settings.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await { tracing::error!("failed to listen for shutdown signal: {}", e); }
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
