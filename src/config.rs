//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::DEFAULT_TTL_SECS;

/// Backing store parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// SQLite database file, or `:memory:`
    pub database_path: String,
    /// How long a connection waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,
}

/// Per-cache TTLs in seconds.
///
/// Kept signed so a negative value from the environment reaches cache
/// construction and is rejected there instead of being clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub user_ttl_secs: i64,
    pub book_ttl_secs: i64,
    pub search_ttl_secs: i64,
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store: StoreConfig,
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Insert the demo books and user at startup
    pub seed_demo: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_PATH` - SQLite file (default: library.db)
    /// - `BUSY_TIMEOUT_MS` - SQLite busy timeout (default: 5000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `USER_CACHE_TTL` - User cache TTL in seconds (default: 30)
    /// - `BOOK_CACHE_TTL` - Book cache TTL in seconds (default: 30)
    /// - `SEARCH_CACHE_TTL` - Search cache TTL in seconds (default: 30)
    /// - `SEED_DEMO` - Seed demo data on startup (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store: StoreConfig {
                database_path: env::var("DATABASE_PATH")
                    .unwrap_or(defaults.store.database_path),
                busy_timeout_ms: env_or("BUSY_TIMEOUT_MS", defaults.store.busy_timeout_ms),
            },
            cache: CacheConfig {
                user_ttl_secs: env_or("USER_CACHE_TTL", defaults.cache.user_ttl_secs),
                book_ttl_secs: env_or("BOOK_CACHE_TTL", defaults.cache.book_ttl_secs),
                search_ttl_secs: env_or("SEARCH_CACHE_TTL", defaults.cache.search_ttl_secs),
            },
            server_port: env_or("SERVER_PORT", defaults.server_port),
            seed_demo: env_or("SEED_DEMO", defaults.seed_demo),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "library.db".to_string(),
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_ttl_secs: DEFAULT_TTL_SECS,
            book_ttl_secs: DEFAULT_TTL_SECS,
            search_ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            cache: CacheConfig::default(),
            server_port: 3000,
            seed_demo: false,
        }
    }
}
