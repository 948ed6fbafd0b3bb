//! SEC EDGAR API client with rate limiting.

use super::filings::{CikLookup, CompanyFilings, FilingInfo};
use crate::error::{DataError, Result};
use crate::http::{self, DEFAULT_MAX_ATTEMPTS, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// SEC EDGAR API base URL
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// Ticker table, hosted at www.sec.gov rather than data.sec.gov
const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// Default rate limit: 10 requests per second (SEC requirement)
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// SEC EDGAR API client with rate limiting
///
/// The SEC rejects anonymous traffic, so every client carries a
/// `"Name email"` style user agent.
#[derive(Clone)]
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    base_url: String,
    max_attempts: usize,
}

impl EdgarClient {
    /// Create a new EDGAR client with default settings (10 req/sec)
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_rate_limit(user_agent, DEFAULT_RATE_LIMIT)
    }

    /// Create a new EDGAR client with custom rate limit
    ///
    /// # Arguments
    /// * `user_agent` - Identifying user agent, e.g. `"Jane Doe jane@example.com"`
    /// * `min_interval` - Minimum duration between requests
    ///
    /// # Example
    /// ```no_run
    /// use finsent_data::edgar::EdgarClient;
    /// use std::time::Duration;
    ///
    /// # fn example() -> finsent_data::Result<()> {
    /// // 5 requests per second
    /// let client = EdgarClient::with_rate_limit("Jane Doe jane@example.com", Duration::from_millis(200))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_rate_limit(user_agent: &str, min_interval: Duration) -> Result<Self> {
        if user_agent.trim().is_empty() {
            return Err(DataError::EdgarApi("SEC requests require a user agent".to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            base_url: EDGAR_BASE_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Override the number of attempts per request.
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    async fn get(&self, url: &str) -> Result<String> {
        http::get_text(&self.client, &self.rate_limiter, url, &[], self.max_attempts).await
    }

    /// Download the full ticker to CIK table.
    pub async fn get_cik_lookup(&self) -> Result<CikLookup> {
        let body = self.get(COMPANY_TICKERS_URL).await?;
        CikLookup::from_json(&body)
    }

    /// Look up a company's CIK number from its ticker symbol
    ///
    /// # Returns
    /// The company's CIK number as a zero-padded 10-digit string
    ///
    /// # Errors
    /// Returns `DataError::CikNotFound` if the ticker is not found
    ///
    /// # Example
    /// ```no_run
    /// use finsent_data::edgar::EdgarClient;
    ///
    /// # async fn example() -> finsent_data::Result<()> {
    /// let client = EdgarClient::new("Jane Doe jane@example.com")?;
    /// let cik = client.get_company_cik("AAPL").await?;
    /// println!("Apple CIK: {}", cik);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_company_cik(&self, ticker: &str) -> Result<String> {
        if ticker.is_empty() {
            return Err(DataError::CikNotFound("(empty ticker)".to_string()));
        }

        let lookup = self.get_cik_lookup().await?;
        lookup
            .get_cik(ticker)
            .map(|(cik, _)| CikLookup::pad_cik(cik))
            .ok_or_else(|| DataError::CikNotFound(ticker.to_string()))
    }

    /// Fetch the raw submissions JSON for a company.
    ///
    /// The body is returned untouched so callers can cache it verbatim.
    pub async fn get_submissions_json(&self, cik: &str) -> Result<String> {
        CikLookup::validate(cik)?;
        let url = format!("{}/submissions/CIK{}.json", self.base_url, CikLookup::pad_cik(cik));
        tracing::debug!(%url, "fetching submissions");
        self.get(&url).await
    }

    /// Get company filings metadata
    ///
    /// # Arguments
    /// * `cik` - Company's CIK number (can be with or without padding)
    ///
    /// # Example
    /// ```no_run
    /// use finsent_data::edgar::EdgarClient;
    ///
    /// # async fn example() -> finsent_data::Result<()> {
    /// let client = EdgarClient::new("Jane Doe jane@example.com")?;
    /// let filings = client.get_company_filings("320193").await?;
    /// println!("{} has {} 10-Ks", filings.name, filings.find_all_by_form("10-K").len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_company_filings(&self, cik: &str) -> Result<CompanyFilings> {
        let body = self.get_submissions_json(cik).await?;
        CompanyFilings::from_json(&body)
    }

    /// Fetch a filing's primary document.
    ///
    /// # Returns
    /// The raw document content (usually HTML) as a string
    pub async fn get_filing_document(&self, cik: &str, filing: &FilingInfo) -> Result<String> {
        CikLookup::validate(cik)?;
        if filing.accession_number.is_empty() {
            return Err(DataError::EdgarApi("Empty accession number".to_string()));
        }
        if filing.primary_document.is_empty() {
            return Err(DataError::EdgarApi("Empty document name".to_string()));
        }

        let url = filing.document_url(cik);
        tracing::debug!(%url, form = %filing.form, "fetching filing document");
        self.get(&url).await
    }
}

impl std::fmt::Debug for EdgarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgarClient")
            .field("base_url", &self.base_url)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
