//! Error types for the library service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors raised by the cache itself. Loader failures are not wrapped here;
/// they reach the caller of `get` unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Negative time-to-live supplied at construction
    #[error("Invalid TTL: {0}s (must not be negative)")]
    InvalidTtl(i64),
}

// == Library Error Enum ==
/// Unified error type for the data service and its store.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Book has no copies left to lend
    #[error("Book not available for borrowing: {0}")]
    NotAvailable(i64),

    /// Return requested for a loan that is not open
    #[error("No active loan found for user {user_id} and book {book_id}")]
    NoActiveLoan { user_id: i64, book_id: i64 },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unique key already taken (email, ISBN)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backing store failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Cache misconfiguration
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for LibraryError {
    fn into_response(self) -> Response {
        let status = match &self {
            LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
            LibraryError::NotAvailable(_) | LibraryError::NoActiveLoan { .. } => {
                StatusCode::CONFLICT
            }
            LibraryError::Conflict(_) => StatusCode::CONFLICT,
            LibraryError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            LibraryError::Database(_) | LibraryError::Cache(_) | LibraryError::Internal(_) => {
                tracing::error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the library service.
pub type Result<T> = std::result::Result<T, LibraryError>;
