//! Request DTOs for the library API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.
//! Book and user creation bodies deserialize straight into `NewBook` and
//! `NewUser`.

use serde::Deserialize;

/// Request body for POST /loans/borrow and POST /loans/return
#[derive(Debug, Clone, Deserialize)]
pub struct LoanRequest {
    pub user_id: i64,
    pub book_id: i64,
}

/// Query string for GET /books/search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    /// Free-text query matched against title and author
    #[serde(default)]
    pub q: String,
}
