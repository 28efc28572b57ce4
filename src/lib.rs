//! Library Cache - a library data service with read-through caching
//!
//! Point lookups and searches are served from TTL caches in front of a
//! SQLite store; writes go to the store first and then refresh or invalidate
//! the caches.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod seed;
pub mod store;

pub use api::AppState;
pub use cache::ExpiringCache;
pub use config::Config;
pub use library::Library;
