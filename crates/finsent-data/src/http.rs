//! Rate limiting and retrying HTTP GETs shared by the EDGAR and FRED clients.

use crate::error::{DataError, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Default number of attempts for a single request (first try included).
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Enforces a minimum interval between consecutive requests to one host.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    pub(crate) async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// Strip the query string so API keys never end up in errors or logs.
pub(crate) fn redact(url: &str) -> String {
    url.split('?').next().unwrap_or(url).to_string()
}

/// GET `url` and return the body as text.
///
/// Each attempt waits on `limiter` first. Transient failures (see
/// [`DataError::is_retryable`]) are retried with jittered exponential backoff
/// starting at 200ms.
pub(crate) async fn get_text(
    client: &reqwest::Client,
    limiter: &Mutex<RateLimiter>,
    url: &str,
    query: &[(&str, String)],
    max_attempts: usize,
) -> Result<String> {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(100)
        .max_delay(Duration::from_secs(10))
        .map(jitter)
        .take(max_attempts.saturating_sub(1));

    let attempt = move || async move {
        limiter.lock().await.wait().await;

        let response = client.get(url).query(query).send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(1_000, |secs| secs * 1_000);
            tracing::warn!(url = %redact(url), retry_after_ms, "rate limited");
            sleep(Duration::from_millis(retry_after_ms)).await;
            return Err(DataError::RateLimit { retry_after_ms });
        }

        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url: redact(url),
            });
        }

        Ok(response.text().await?)
    };

    RetryIf::spawn(strategy, attempt, |e: &DataError| {
        let retry = e.is_retryable();
        if retry {
            tracing::warn!(error = %e, "retrying request");
        }
        retry
    })
    .await
}
