//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error, with the request URL removed
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Status code returned by the server
        status: u16,
        /// Requested URL (query string stripped)
        url: String,
    },

    /// Rate limit error
    #[error("Rate limit exceeded, please retry after {retry_after_ms}ms")]
    RateLimit {
        /// Milliseconds to wait before retrying
        retry_after_ms: u64,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SEC EDGAR API error
    #[error("EDGAR API error: {0}")]
    EdgarApi(String),

    /// FRED API error
    #[error("FRED API error: {0}")]
    FredApi(String),

    /// CIK not found for ticker
    #[error("CIK not found for ticker: {0}")]
    CikNotFound(String),

    /// Malformed CIK
    #[error("Invalid CIK: {0}")]
    InvalidCik(String),

    /// Missing or placeholder API key
    #[error("Missing API key for {0}")]
    MissingApiKey(String),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(String),
}

// FRED keys travel in the query string; reqwest would print them.
impl From<reqwest::Error> for DataError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.without_url())
    }
}

impl DataError {
    /// Whether a retry has a chance of succeeding.
    ///
    /// Connection failures, timeouts, throttling and server-side errors are
    /// transient; everything else is returned to the caller immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::RateLimit { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(429, true)]
    #[case(500, true)]
    #[case(503, true)]
    #[case(404, false)]
    #[case(403, false)]
    fn test_http_status_retryable(#[case] status: u16, #[case] expected: bool) {
        let err = DataError::HttpStatus {
            status,
            url: "https://data.sec.gov".to_string(),
        };
        assert_eq!(err.is_retryable(), expected);
    }

    #[test]
    fn test_rate_limit_retryable() {
        assert!(DataError::RateLimit { retry_after_ms: 10 }.is_retryable());
        assert!(!DataError::Parse("bad".to_string()).is_retryable());
        assert!(!DataError::MissingApiKey("fred".to_string()).is_retryable());
    }
}
