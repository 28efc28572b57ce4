//! Domain models and the DTOs used by the HTTP API

pub mod book;
pub mod requests;
pub mod responses;
pub mod user;

// Re-export commonly used types
pub use book::{Book, NewBook};
pub use requests::{LoanRequest, SearchQuery};
pub use responses::{ErrorResponse, HealthResponse, SearchResponse, StatsResponse};
pub use user::{NewUser, User};
