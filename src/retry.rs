//! Exponential-backoff retry helper used for DB round trips.
//!
//! The lobby and developer services talk to the DB service over a fresh
//! TCP connection per request (spec.md §4.2/§4.4: "Lobby ... open
//! short-lived framed connections to DB per request"). A momentarily
//! unavailable DB connection should not surface as a user-visible
//! `DB_ERROR` if a quick retry would succeed, so every DB round trip is
//! wrapped by [`RetryExecutor`].

use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry logic with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::db_call()
    }
}

impl RetryConfig {
    /// Tuned for a same-host DB round trip: quick, few attempts.
    pub fn db_call() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(400),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

/// Retry executor with exponential backoff and jitter.
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute `operation`, retrying on `Err` up to `max_attempts` times.
    pub async fn execute<T, F, Fut>(&self, operation_name: &str, operation: F) -> anyhow::Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<T>>,
    {
        let mut attempt = 1;
        let mut delay = self.config.initial_delay;

        loop {
            debug!(operation = operation_name, attempt, "db round trip attempt");
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt >= self.config.max_attempts {
                        warn!(operation = operation_name, attempt, %error, "db round trip exhausted retries");
                        return Err(error);
                    }

                    warn!(operation = operation_name, attempt, %error, delay_ms = delay.as_millis(), "db round trip failed, retrying");
                    tokio::time::sleep(delay).await;

                    let next = Duration::from_millis(
                        (delay.as_millis() as f64 * self.config.backoff_multiplier) as u64,
                    );
                    delay = std::cmp::min(next, self.config.max_delay);
                    if self.config.jitter_factor > 0.0 {
                        let jitter_ms = (delay.as_millis() as f64 * self.config.jitter_factor) as u64;
                        let jitter = rand::random::<u64>() % (jitter_ms + 1);
                        delay += Duration::from_millis(jitter);
                    }
                    attempt += 1;
                }
            }
        }
    }
}
