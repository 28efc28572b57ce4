//! Response DTOs for the library API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::library::LibraryCacheStats;
use crate::models::Book;

/// Response body for GET /books/search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// The query as received
    pub query: String,
    /// Number of matching books
    pub count: usize,
    pub books: Vec<Book>,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, books: Vec<Book>) -> Self {
        Self {
            query: query.into(),
            count: books.len(),
            books,
        }
    }
}

/// Statistics for a single cache, as reported by GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsBody {
    pub hits: u64,
    pub misses: u64,
    pub load_failures: u64,
    pub invalidations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsBody {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            load_failures: stats.load_failures,
            invalidations: stats.invalidations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub users: CacheStatsBody,
    pub books: CacheStatsBody,
    pub searches: CacheStatsBody,
}

impl From<LibraryCacheStats> for StatsResponse {
    fn from(stats: LibraryCacheStats) -> Self {
        Self {
            users: stats.users.into(),
            books: stats.books.into(),
            searches: stats.searches.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
