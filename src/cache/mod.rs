//! Cache Module
//!
//! Provides a generic in-memory read-through cache with TTL expiration.

mod clock;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsRecorder};
pub use store::ExpiringCache;

// == Public Constants ==
/// TTL applied to each of the library caches when none is configured
pub const DEFAULT_TTL_SECS: i64 = 30;
