//! Cache manager for collected responses.
//!
//! Wraps the SQLite cache so concurrent collection tasks can share it, and
//! turns cache failures into warnings: a broken cache slows collection down
//! but never stops it.

use finsent_data::cache::{CacheSource, FilingRecord, SqliteCache};
use finsent_data::error::DataError;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cached responses older than this are fetched again.
pub(crate) const RESPONSE_MAX_AGE_HOURS: i64 = 24;

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache(path: &Path) -> Result<SqliteCache, DataError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    SqliteCache::new(path)
}

/// Print cache location and contents.
pub(crate) fn print_cache_info(path: &Path) {
    println!("  Cache location: {}", path.display());
    match open_cache(path).and_then(|cache| cache.get_stats()) {
        Ok(stats) => {
            println!("  EDGAR responses:  {}", stats.edgar_responses);
            println!("  FRED responses:   {}", stats.fred_responses);
            println!("  Policy responses: {}", stats.policy_responses);
            println!(
                "  Filings:          {} ({} companies)",
                stats.filings, stats.companies
            );
            println!("  CIK mappings:     {}", stats.cik_mappings);
        }
        Err(e) => println!("  Cache unavailable: {}", e),
    }
}

/// Shared handle to an optional response cache.
#[derive(Clone)]
pub(crate) struct ResponseCache {
    inner: Arc<Mutex<Option<SqliteCache>>>,
    max_age: chrono::Duration,
    refresh: bool,
}

impl ResponseCache {
    /// Open the cache at `path`. When it cannot be opened, collection runs uncached.
    pub(crate) fn open(path: &Path, refresh: bool) -> Self {
        let cache = match open_cache(path) {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache unavailable, continuing without it");
                None
            }
        };
        Self::with_cache(cache, refresh)
    }

    /// A cache that stores nothing.
    pub(crate) fn disabled() -> Self {
        Self::with_cache(None, false)
    }

    fn with_cache(cache: Option<SqliteCache>, refresh: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
            max_age: chrono::Duration::hours(RESPONSE_MAX_AGE_HOURS),
            refresh,
        }
    }

    /// Return the cached body for `key`, or run `fetch` and store its result.
    pub(crate) async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        source: CacheSource,
        fetch: F,
    ) -> Result<String, DataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, DataError>>,
    {
        if !self.refresh {
            let guard = self.inner.lock().await;
            if let Some(cache) = guard.as_ref() {
                match cache.get_response(key, self.max_age) {
                    Ok(Some(body)) => {
                        tracing::debug!(key, "cache hit");
                        return Ok(body);
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(key, error = %e, "cache read failed"),
                }
            }
        }

        let body = fetch().await?;

        let guard = self.inner.lock().await;
        if let Some(cache) = guard.as_ref()
            && let Err(e) = cache.put_response(key, source, &body)
        {
            tracing::warn!(key, error = %e, "failed to cache response");
        }
        Ok(body)
    }

    /// Cached CIK for a ticker.
    pub(crate) async fn get_cik(&self, ticker: &str) -> Option<String> {
        let guard = self.inner.lock().await;
        guard.as_ref().and_then(|cache| cache.get_cik(ticker).ok().flatten())
    }

    /// Remember the CIK of a ticker.
    pub(crate) async fn put_cik(&self, ticker: &str, cik: &str, name: &str) {
        let guard = self.inner.lock().await;
        if let Some(cache) = guard.as_ref()
            && let Err(e) = cache.put_cik(ticker, cik, Some(name))
        {
            tracing::warn!(ticker, error = %e, "failed to cache CIK");
        }
    }

    /// Index a filing written to disk.
    pub(crate) async fn record_filing(&self, record: &FilingRecord) {
        let guard = self.inner.lock().await;
        if let Some(cache) = guard.as_ref()
            && let Err(e) = cache.record_filing(record)
        {
            tracing::warn!(accession = %record.accession, error = %e, "failed to index filing");
        }
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("max_age", &self.max_age)
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_fetch_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::open(&dir.path().join("nested").join("cache.db"), false);

        let first = cache
            .get_or_fetch("k", CacheSource::Fred, || async { Ok("fresh".to_string()) })
            .await
            .unwrap();
        assert_eq!(first, "fresh");

        let second = cache
            .get_or_fetch("k", CacheSource::Fred, || async {
                Err(DataError::Parse("should not be called".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(second, "fresh");
    }

    #[tokio::test]
    async fn test_refresh_bypasses_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        ResponseCache::open(&path, false)
            .get_or_fetch("k", CacheSource::Edgar, || async { Ok("old".to_string()) })
            .await
            .unwrap();

        let refreshed = ResponseCache::open(&path, true)
            .get_or_fetch("k", CacheSource::Edgar, || async { Ok("new".to_string()) })
            .await
            .unwrap();
        assert_eq!(refreshed, "new");
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let cache = ResponseCache::disabled();
        assert!(cache.get_cik("AAPL").await.is_none());
        cache.put_cik("AAPL", "320193", "Apple").await;
        assert!(cache.get_cik("AAPL").await.is_none());
    }
}
