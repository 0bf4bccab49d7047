//! Book endpoints.
//!
//! | Method | Path | |
//! |--------|------|-|
//! | POST | /books | save one book |
//! | POST | /books/bulk | save a list of books |
//! | GET | /books/search?query= | free-text search (query required) |
//! | GET | /books/genre | book count per genre |
//! | GET | /books/searchBooks?genre=&query= | combined search, both optional |
//! | GET | /health | liveness |

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use booksearch_core::traits::SearchEngine;
use booksearch_core::{Book, BookService, GenreCounts};

use crate::error::ApiError;

type Service<E> = Arc<BookService<E>>;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CombinedSearchParams {
    pub genre: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
}

pub fn router<E: SearchEngine + 'static>(service: Service<E>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/books", post(save_book::<E>))
        .route("/books/bulk", post(save_books::<E>))
        .route("/books/search", get(search_books::<E>))
        .route("/books/genre", get(genre_counts::<E>))
        .route("/books/searchBooks", get(search_by::<E>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Runs an engine-bound call off the async runtime.
async fn blocking<E, T, F>(service: Service<E>, call: F) -> Result<T, ApiError>
where
    E: SearchEngine + 'static,
    T: Send + 'static,
    F: FnOnce(&BookService<E>) -> booksearch_core::Result<T> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(move || call(service.as_ref())).await??)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { service: "booksearch".to_string(), status: "ok".to_string() })
}

async fn save_book<E: SearchEngine + 'static>(
    State(service): State<Service<E>>,
    Json(book): Json<Book>,
) -> Result<Json<Book>, ApiError> {
    let saved = blocking(service, move |s| s.save_book(&book)).await?;
    tracing::info!(id = %saved.id, "saved book");
    Ok(Json(saved))
}

async fn save_books<E: SearchEngine + 'static>(
    State(service): State<Service<E>>,
    Json(books): Json<Vec<Book>>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let saved = blocking(service, move |s| s.save_books(&books)).await?;
    tracing::info!(count = saved.len(), "saved books");
    Ok(Json(saved))
}

async fn search_books<E: SearchEngine + 'static>(
    State(service): State<Service<E>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Book>>, ApiError> {
    tracing::info!(query = %params.query, "search");
    let books = blocking(service, move |s| s.search_books(&params.query)).await?;
    Ok(Json(books))
}

async fn genre_counts<E: SearchEngine + 'static>(
    State(service): State<Service<E>>,
) -> Result<Json<GenreCounts>, ApiError> {
    let counts = blocking(service, |s| s.count_by_genre()).await?;
    Ok(Json(counts))
}

async fn search_by<E: SearchEngine + 'static>(
    State(service): State<Service<E>>,
    Query(params): Query<CombinedSearchParams>,
) -> Result<Json<Vec<Book>>, ApiError> {
    tracing::info!(?params, "combined search");
    let books = blocking(service, move |s| {
        s.search_by(params.genre.as_deref(), params.query.as_deref())
    })
    .await?;
    Ok(Json(books))
}
