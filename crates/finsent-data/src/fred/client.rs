//! FRED API client.

use super::series::{Observation, ObservationsResponse, SeriesInfo, SeriesResponse};
use crate::error::{DataError, Result};
use crate::http::{self, DEFAULT_MAX_ATTEMPTS, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// FRED API base URL
const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Value shipped in the example config; treated as no key at all.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_FRED_API_KEY_HERE";

/// Default spacing between FRED requests.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Whether `key` looks like a real FRED API key.
pub fn is_usable_api_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

/// Sort order for observation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first
    Asc,
    /// Newest first
    #[default]
    Desc,
}

impl SortOrder {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Parameters for `/fred/series/observations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObservationQuery {
    /// Maximum number of observations, `None` for the full history
    pub limit: Option<usize>,
    /// Sort order
    pub sort: SortOrder,
}

impl ObservationQuery {
    /// The most recent `limit` observations, newest first.
    pub const fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            sort: SortOrder::Desc,
        }
    }

    /// Full history, newest first.
    pub const fn full_history() -> Self {
        Self {
            limit: None,
            sort: SortOrder::Desc,
        }
    }

    /// Stable key for caching this query's response.
    pub fn cache_key(&self, series_id: &str) -> String {
        match self.limit {
            Some(limit) => format!("fred:observations:{}:{}:{}", series_id, self.sort.as_str(), limit),
            None => format!("fred:observations:{}:{}:all", series_id, self.sort.as_str()),
        }
    }
}

/// Parse a `/fred/series` body, taking the first entry of `seriess`.
pub fn parse_series_info(series_id: &str, body: &str) -> Result<SeriesInfo> {
    let response: SeriesResponse = serde_json::from_str(body)?;
    response
        .seriess
        .into_iter()
        .next()
        .ok_or_else(|| DataError::FredApi(format!("No series info found for {}", series_id)))
}

/// Parse a `/fred/series/observations` body.
pub fn parse_observations(body: &str) -> Result<Vec<Observation>> {
    let response: ObservationsResponse = serde_json::from_str(body)?;
    Ok(response.observations)
}

/// FRED API client with rate limiting.
///
/// The API key is sent as a query parameter and is redacted from every
/// error and log line.
#[derive(Clone)]
pub struct FredClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    api_key: String,
    base_url: String,
    max_attempts: usize,
}

impl FredClient {
    /// Create a client with the default rate limit.
    ///
    /// # Errors
    /// `DataError::MissingApiKey` when the key is empty or the example placeholder.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_rate_limit(api_key, DEFAULT_RATE_LIMIT)
    }

    /// Create a client with a custom minimum interval between requests.
    pub fn with_rate_limit(api_key: &str, min_interval: Duration) -> Result<Self> {
        if !is_usable_api_key(api_key) {
            return Err(DataError::MissingApiKey("FRED".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            api_key: api_key.trim().to_string(),
            base_url: FRED_BASE_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Override the number of attempts per request.
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    async fn get(&self, path: &str, params: Vec<(&str, String)>) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        let mut query = params;
        query.push(("api_key", self.api_key.clone()));
        query.push(("file_type", "json".to_string()));
        http::get_text(&self.client, &self.rate_limiter, &url, &query, self.max_attempts).await
    }

    /// Raw `/fred/series` body.
    pub async fn series_info_raw(&self, series_id: &str) -> Result<String> {
        self.get("series", vec![("series_id", series_id.to_string())]).await
    }

    /// Metadata for a series.
    pub async fn series_info(&self, series_id: &str) -> Result<SeriesInfo> {
        let body = self.series_info_raw(series_id).await?;
        parse_series_info(series_id, &body)
    }

    /// Raw `/fred/series/observations` body.
    pub async fn observations_raw(&self, series_id: &str, query: ObservationQuery) -> Result<String> {
        let mut params = vec![
            ("series_id", series_id.to_string()),
            ("sort_order", query.sort.as_str().to_string()),
        ];
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        tracing::debug!(series_id, limit = ?query.limit, "fetching observations");
        self.get("series/observations", params).await
    }

    /// Observations for a series.
    ///
    /// # Example
    /// ```no_run
    /// use finsent_data::fred::{FredClient, ObservationQuery};
    ///
    /// # async fn example() -> finsent_data::Result<()> {
    /// let client = FredClient::new("my-api-key")?;
    /// let obs = client.observations("UNRATE", ObservationQuery::latest(24)).await?;
    /// println!("latest: {:?}", obs.first().and_then(|o| o.numeric()));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn observations(&self, series_id: &str, query: ObservationQuery) -> Result<Vec<Observation>> {
        let body = self.observations_raw(series_id, query).await?;
        parse_observations(&body)
    }
}

impl std::fmt::Debug for FredClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FredClient")
            .field("base_url", &self.base_url)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
