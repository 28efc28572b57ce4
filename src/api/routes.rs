//! API Routes
//!
//! Configures the Axum router with all library endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_book_handler, add_user_handler, borrow_handler, get_book_handler, get_user_handler,
    health_handler, return_handler, search_books_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // `/books/search` is registered before the `:isbn` capture
    Router::new()
        .route("/books", post(add_book_handler))
        .route("/books/search", get(search_books_handler))
        .route("/books/:isbn", get(get_book_handler))
        .route("/users", post(add_user_handler))
        .route("/users/:email", get(get_user_handler))
        .route("/loans/borrow", post(borrow_handler))
        .route("/loans/return", post(return_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
