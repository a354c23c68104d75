use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::warn;

use crate::error::Result;
use crate::scrapers::traits::PageSource;

/// Bounded exponential backoff for page-source calls
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Retries failed navigation and page reads of the wrapped source.
/// `has_next_page` is passed through untouched.
pub struct RetryingPageSource<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: PageSource> RetryingPageSource<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    fn with_retry<T>(&mut self, action: &str, mut call: impl FnMut(&mut P) -> Result<T>) -> Result<T> {
        let mut attempt = 1;
        loop {
            match call(&mut self.inner) {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        action, attempt, self.policy.max_attempts, e, delay
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<P: PageSource> PageSource for RetryingPageSource<P> {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.with_retry("navigate", |inner| inner.navigate(url))
    }

    fn submit_search(&mut self, phrase: &str) -> Result<()> {
        self.with_retry("submit_search", |inner| inner.submit_search(phrase))
    }

    fn current_page_html(&mut self) -> Result<String> {
        self.with_retry("current_page_html", |inner| inner.current_page_html())
    }

    fn has_next_page(&mut self) -> bool {
        self.inner.has_next_page()
    }

    fn go_to_next_page(&mut self) -> Result<()> {
        self.with_retry("go_to_next_page", |inner| inner.go_to_next_page())
    }
}
