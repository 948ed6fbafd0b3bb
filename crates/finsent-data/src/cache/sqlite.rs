//! SQLite caching layer for API responses and downloaded filings.

use crate::error::{DataError, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// SQLite cache for API responses.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

/// Upstream service a cached response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheSource {
    /// SEC EDGAR
    Edgar,
    /// FRED economic indicators
    Fred,
    /// FRED economic policy uncertainty series
    Policy,
}

impl CacheSource {
    /// All sources, in collection order.
    pub const ALL: [Self; 3] = [Self::Edgar, Self::Fred, Self::Policy];

    /// Convert to database string representation.
    pub const fn to_db_str(&self) -> &'static str {
        match self {
            Self::Edgar => "edgar",
            Self::Fred => "fred",
            Self::Policy => "policy",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self> {
        match s {
            "edgar" => Ok(Self::Edgar),
            "fred" => Ok(Self::Fred),
            "policy" => Ok(Self::Policy),
            _ => Err(DataError::Parse(format!("Invalid cache source: {}", s))),
        }
    }
}

/// A filing that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingRecord {
    /// Accession number
    pub accession: String,
    /// Company CIK (unpadded)
    pub cik: String,
    /// Form type
    pub form: String,
    /// Filing date, `YYYY-MM-DD`
    pub filing_date: String,
    /// Primary document filename
    pub primary_document: String,
    /// Where the document was saved
    pub path: String,
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// Parent directories are created if missing.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        // Raw response bodies keyed by request identity
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS http_responses (
                key TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                body TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_responses_source ON http_responses(source)",
            [],
        )?;

        // Filings already saved to disk
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS filings (
                accession TEXT PRIMARY KEY,
                cik TEXT NOT NULL,
                form TEXT NOT NULL,
                filing_date TEXT NOT NULL,
                primary_document TEXT NOT NULL,
                path TEXT NOT NULL,
                downloaded_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_filings_cik ON filings(cik)",
            [],
        )?;

        // Company CIK mappings
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS company_ciks (
                symbol TEXT PRIMARY KEY,
                cik TEXT NOT NULL,
                company_name TEXT,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get a cached response body if it is younger than `max_age`.
    pub fn get_response(&self, key: &str, max_age: Duration) -> Result<Option<String>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT body, fetched_at FROM http_responses WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((body, fetched_at)) = row else {
            return Ok(None);
        };

        let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
            .map_err(|e| DataError::Cache(format!("Bad timestamp for {}: {}", key, e)))?
            .with_timezone(&Utc);

        if Utc::now() - fetched_at > max_age {
            tracing::debug!(key, "cached response expired");
            return Ok(None);
        }

        Ok(Some(body))
    }

    /// Store a response body.
    pub fn put_response(&self, key: &str, source: CacheSource, body: &str) -> Result<()> {
        self.put_response_at(key, source, body, Utc::now())
    }

    fn put_response_at(
        &self,
        key: &str,
        source: CacheSource,
        body: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO http_responses (key, source, body, fetched_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, source.to_db_str(), body, fetched_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Record that a filing was downloaded.
    pub fn record_filing(&self, record: &FilingRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO filings
             (accession, cik, form, filing_date, primary_document, path, downloaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.accession,
                record.cik,
                record.form,
                record.filing_date,
                record.primary_document,
                record.path,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Get CIK for a symbol.
    pub fn get_cik(&self, symbol: &str) -> Result<Option<String>> {
        let cik = self
            .conn
            .query_row(
                "SELECT cik FROM company_ciks WHERE symbol = ?1",
                params![symbol.to_uppercase()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(cik)
    }

    /// Store CIK mapping for a symbol.
    pub fn put_cik(&self, symbol: &str, cik: &str, company_name: Option<&str>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO company_ciks (symbol, cik, company_name, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![symbol.to_uppercase(), cik, company_name, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM http_responses", [])?;
        tx.execute("DELETE FROM filings", [])?;
        tx.execute("DELETE FROM company_ciks", [])?;
        tx.commit()?;
        Ok(())
    }

    /// Clear cached data for one source. Returns the number of rows removed.
    pub fn clear_source(&self, source: CacheSource) -> Result<usize> {
        let mut removed = self.conn.execute(
            "DELETE FROM http_responses WHERE source = ?1",
            params![source.to_db_str()],
        )?;
        if source == CacheSource::Edgar {
            removed += self.conn.execute("DELETE FROM filings", [])?;
            removed += self.conn.execute("DELETE FROM company_ciks", [])?;
        }
        Ok(removed)
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let count_source = |source: CacheSource| -> Result<usize> {
            let n: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM http_responses WHERE source = ?1",
                params![source.to_db_str()],
                |row| row.get(0),
            )?;
            Ok(n as usize)
        };

        let filings_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM filings", [], |row| row.get(0))?;

        let companies_count: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT cik) FROM filings", [], |row| {
                    row.get(0)
                })?;

        let cik_mappings_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM company_ciks", [], |row| row.get(0))?;

        Ok(CacheStats {
            edgar_responses: count_source(CacheSource::Edgar)?,
            fred_responses: count_source(CacheSource::Fred)?,
            policy_responses: count_source(CacheSource::Policy)?,
            filings: filings_count as usize,
            companies: companies_count as usize,
            cik_mappings: cik_mappings_count as usize,
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Cached EDGAR responses
    pub edgar_responses: usize,
    /// Cached FRED indicator responses
    pub fred_responses: usize,
    /// Cached policy uncertainty responses
    pub policy_responses: usize,
    /// Downloaded filings
    pub filings: usize,
    /// Companies with at least one downloaded filing
    pub companies: usize,
    /// Number of CIK mappings
    pub cik_mappings: usize,
}

impl CacheStats {
    /// Total cached responses across all sources.
    pub const fn total_responses(&self) -> usize {
        self.edgar_responses + self.fred_responses + self.policy_responses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(accession: &str, cik: &str, date: &str) -> FilingRecord {
        FilingRecord {
            accession: accession.to_string(),
            cik: cik.to_string(),
            form: "10-K".to_string(),
            filing_date: date.to_string(),
            primary_document: "doc.htm".to_string(),
            path: format!("/tmp/{}.txt", accession),
        }
    }

    #[test]
    fn test_cache_initialization() {
        let cache = SqliteCache::in_memory().unwrap();
        assert_eq!(cache.get_stats().unwrap(), CacheStats::default());
    }

    #[test]
    fn test_response_roundtrip() {
        let cache = SqliteCache::in_memory().unwrap();
        cache
            .put_response("edgar:submissions:320193", CacheSource::Edgar, "{\"cik\":1}")
            .unwrap();

        let body = cache
            .get_response("edgar:submissions:320193", Duration::hours(1))
            .unwrap();
        assert_eq!(body.as_deref(), Some("{\"cik\":1}"));
        assert!(cache.get_response("missing", Duration::hours(1)).unwrap().is_none());
    }

    #[test]
    fn test_response_expiry() {
        let cache = SqliteCache::in_memory().unwrap();
        let old = Utc::now() - Duration::days(3);
        cache
            .put_response_at("fred:series:GDP", CacheSource::Fred, "{}", old)
            .unwrap();

        assert!(cache.get_response("fred:series:GDP", Duration::days(1)).unwrap().is_none());
        assert!(cache.get_response("fred:series:GDP", Duration::days(7)).unwrap().is_some());
    }

    #[test]
    fn test_filing_operations() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.record_filing(&record("a-1", "320193", "2023-11-03")).unwrap();
        cache.record_filing(&record("a-2", "320193", "2024-02-02")).unwrap();
        cache.record_filing(&record("b-1", "19617", "2024-01-12")).unwrap();

        // re-downloading replaces the row
        cache.record_filing(&record("a-1", "320193", "2023-11-03")).unwrap();

        let stats = cache.get_stats().unwrap();
        assert_eq!(stats.filings, 3);
        assert_eq!(stats.companies, 2);
    }

    #[test]
    fn test_cik_operations() {
        let cache = SqliteCache::in_memory().unwrap();
        assert!(cache.get_cik("AAPL").unwrap().is_none());

        cache.put_cik("aapl", "0000320193", Some("Apple Inc.")).unwrap();
        assert_eq!(cache.get_cik("AAPL").unwrap(), Some("0000320193".to_string()));
        assert_eq!(cache.get_stats().unwrap().cik_mappings, 1);
    }

    #[test]
    fn test_clear_operations() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put_response("e", CacheSource::Edgar, "1").unwrap();
        cache.put_response("f", CacheSource::Fred, "2").unwrap();
        cache.put_response("p", CacheSource::Policy, "3").unwrap();
        cache.record_filing(&record("a-1", "320193", "2023-11-03")).unwrap();

        let removed = cache.clear_source(CacheSource::Fred).unwrap();
        assert_eq!(removed, 1);
        let stats = cache.get_stats().unwrap();
        assert_eq!(stats.fred_responses, 0);
        assert_eq!(stats.total_responses(), 2);
        assert_eq!(stats.filings, 1);

        cache.clear_all().unwrap();
        assert_eq!(cache.get_stats().unwrap(), CacheStats::default());
    }

    #[test]
    fn test_cache_source_conversion() {
        for source in CacheSource::ALL {
            assert_eq!(CacheSource::from_db_str(source.to_db_str()).unwrap(), source);
        }
        assert!(CacheSource::from_db_str("yahoo").is_err());
    }
}
