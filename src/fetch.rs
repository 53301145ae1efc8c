//! Page fetching, plain and with retries.
//!
//! # Architecture
//!
//! - [`Fetch`]: Core trait defining async page retrieval
//! - [`HttpFetcher`]: `reqwest`-backed implementation with a per-source user agent
//! - [`RetryFetch`]: retries any `Fetch` with capped exponential backoff
//!
//! Retries cover transport failures only. Politeness spacing between
//! requests is the crawl worker's job.

use rand::{Rng, rng};
use std::error::Error;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

/// A fetched HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    /// Final URL after redirects.
    pub url: Url,
    pub html: String,
}

/// Trait for async page retrieval.
pub trait Fetch {
    async fn fetch(&self, url: &Url) -> Result<FetchedBody, Box<dyn Error>>;
}

/// Plain HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client that identifies itself with `user_agent`.
    pub fn new(user_agent: &str, timeout: StdDuration) -> Result<Self, Box<dyn Error>> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<FetchedBody, Box<dyn Error>> {
        let t0 = Instant::now();
        let resp = self.client.get(url.clone()).send().await?.error_for_status()?;
        let final_url = resp.url().clone();
        let html = resp.text().await?;
        debug!(
            bytes = html.len(),
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "Fetched page"
        );
        Ok(FetchedBody { url: final_url, html })
    }
}

/// Retries failed fetches of one URL with exponential backoff.
///
/// The n-th retry waits `base_delay * 2^(n-1)`, capped at [`MAX_BACKOFF`],
/// plus up to 250ms of jitter.
#[derive(Debug)]
pub struct RetryFetch<T> {
    inner: T,
    retries: usize,
    base_delay: StdDuration,
}

/// Longest wait between two attempts, jitter excluded.
pub const MAX_BACKOFF: StdDuration = StdDuration::from_secs(30);

impl<T: Fetch> RetryFetch<T> {
    pub fn new(inner: T, retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            retries,
            base_delay,
        }
    }

    fn backoff(&self, retry: usize) -> StdDuration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1) as u32).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

impl<T: Fetch> Fetch for RetryFetch<T> {
    async fn fetch(&self, url: &Url) -> Result<FetchedBody, Box<dyn Error>> {
        let mut retry = 0;
        loop {
            let err = match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };
            if retry == self.retries {
                return Err(err);
            }
            retry += 1;
            let wait = self.backoff(retry) + StdDuration::from_millis(rng().random_range(0..=250));
            warn!(%url, retry, of = self.retries, ?wait, error = %err, "Fetch failed; retrying");
            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
    }

    impl Fetch for Flaky {
        async fn fetch(&self, url: &Url) -> Result<FetchedBody, Box<dyn Error>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err("connection reset".into());
            }
            Ok(FetchedBody {
                url: url.clone(),
                html: "<html></html>".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let inner = Flaky {
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        let fetcher = RetryFetch::new(inner, 3, StdDuration::from_millis(1));
        let url = Url::parse("https://www.heraldo.es/").unwrap();
        let body = fetcher.fetch(&url).await.unwrap();
        assert_eq!(body.url, url);
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let inner = Flaky {
            failures: usize::MAX,
            calls: AtomicUsize::new(0),
        };
        let fetcher = RetryFetch::new(inner, 1, StdDuration::from_millis(1));
        let url = Url::parse("https://www.heraldo.es/").unwrap();
        assert!(fetcher.fetch(&url).await.is_err());
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let inner = Flaky {
            failures: 0,
            calls: AtomicUsize::new(0),
        };
        let fetcher = RetryFetch::new(inner, 10, StdDuration::from_secs(1));
        let waits: Vec<u64> = (1..=7).map(|n| fetcher.backoff(n).as_secs()).collect();
        assert_eq!(waits, vec![1, 2, 4, 8, 16, 30, 30]);
        assert_eq!(fetcher.backoff(64), MAX_BACKOFF);
    }
}
