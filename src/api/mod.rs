//! API Module
//!
//! HTTP handlers and routing for the library REST API.
//!
//! # Endpoints
//! - `POST /books` - Add a book
//! - `GET /books/search?q=` - Search books by title or author
//! - `GET /books/:isbn` - Look up a book by ISBN
//! - `POST /users` - Add a user
//! - `GET /users/:email` - Look up a user by email
//! - `POST /loans/borrow` - Borrow a book
//! - `POST /loans/return` - Return a book
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
