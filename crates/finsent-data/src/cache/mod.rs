//! Caching layer for API responses and downloaded filings.

pub mod sqlite;

pub use sqlite::{CacheSource, CacheStats, FilingRecord, SqliteCache};
