//! API Handlers
//!
//! HTTP request handlers for each library endpoint. The data service is
//! synchronous, so each call runs on tokio's blocking pool.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::config::Config;
use crate::error::{LibraryError, Result};
use crate::library::Library;
use crate::models::{
    Book, HealthResponse, LoanRequest, NewBook, NewUser, SearchQuery, SearchResponse,
    StatsResponse, User,
};
use crate::store::SqliteStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<Library>,
}

impl AppState {
    /// Creates a new AppState around the given data service.
    pub fn new(library: Library) -> Self {
        Self {
            library: Arc::new(library),
        }
    }

    /// Opens the SQLite store and builds the caches from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::open(&config.store)?);
        let library = Library::new(store, &config.cache)?;
        Ok(Self::new(library))
    }

    /// Runs a data-service call off the async executor.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Library) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let library = Arc::clone(&self.library);
        tokio::task::spawn_blocking(move || op(&library))
            .await
            .map_err(|e| LibraryError::Internal(format!("blocking task failed: {}", e)))?
    }
}

/// Handler for POST /books
pub async fn add_book_handler(
    State(state): State<AppState>,
    Json(book): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>)> {
    let book = state.run(move |library| library.add_book(book)).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Handler for GET /books/search?q=
pub async fn search_books_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let q = query.q.clone();
    let books = state.run(move |library| library.search_books(&q)).await?;
    Ok(Json(SearchResponse::new(query.q, books)))
}

/// Handler for GET /books/:isbn
pub async fn get_book_handler(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> Result<Json<Book>> {
    let lookup = isbn.clone();
    state
        .run(move |library| library.find_book_by_isbn(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| LibraryError::NotFound(format!("book {}", isbn)))
}

/// Handler for POST /users
pub async fn add_user_handler(
    State(state): State<AppState>,
    Json(user): Json<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.run(move |library| library.add_user(user)).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for GET /users/:email
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>> {
    let lookup = email.clone();
    state
        .run(move |library| library.find_user_by_email(&lookup))
        .await?
        .map(Json)
        .ok_or_else(|| LibraryError::NotFound(format!("user {}", email)))
}

/// Handler for POST /loans/borrow
pub async fn borrow_handler(
    State(state): State<AppState>,
    Json(req): Json<LoanRequest>,
) -> Result<Json<Book>> {
    let book = state
        .run(move |library| library.borrow_book(req.user_id, req.book_id))
        .await?;
    Ok(Json(book))
}

/// Handler for POST /loans/return
pub async fn return_handler(
    State(state): State<AppState>,
    Json(req): Json<LoanRequest>,
) -> Result<Json<Book>> {
    let book = state
        .run(move |library| library.return_book(req.user_id, req.book_id))
        .await?;
    Ok(Json(book))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.library.cache_stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
