//! Bounded exponential backoff around Wikidata requests.
//!
//! Rate limiting, request timeouts, server errors and transport failures are
//! retried; any other non-success status fails on the first attempt.

use anyhow::Result;
use reqwest::{Response, StatusCode};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Call `operation` until it returns a success status, a non-retryable
/// status, or `max_attempts` is used up.
pub async fn with_retry<F, Fut>(config: &RetryConfig, endpoint: &str, operation: F) -> Result<Response>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<Response>>,
{
    let attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut last_error = None;

    for attempt in 1..=attempts {
        match operation().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    if attempt > 1 {
                        tracing::info!("{} succeeded on attempt {}", endpoint, attempt);
                    }
                    return Ok(response);
                }

                let error_text = response.text().await.unwrap_or_default();
                if !is_retryable_status(status) {
                    anyhow::bail!("{} returned {}: {}", endpoint, status, error_text);
                }

                tracing::warn!(
                    "{} returned {} on attempt {}/{}: {}",
                    endpoint,
                    status,
                    attempt,
                    attempts,
                    error_text.chars().take(200).collect::<String>()
                );
                last_error = Some(format!("{} ({})", endpoint, status));
            }
            Err(e) => {
                tracing::warn!(
                    "{} network error on attempt {}/{}: {}",
                    endpoint,
                    attempt,
                    attempts,
                    e
                );
                last_error = Some(format!("{}: {}", endpoint, e));
            }
        }

        if attempt < attempts {
            tokio::time::sleep(delay).await;
            delay = Duration::from_secs_f64(
                (delay.as_secs_f64() * config.backoff_factor).min(config.max_delay.as_secs_f64()),
            );
        }
    }

    anyhow::bail!(
        "All {} attempts exhausted. Last error: {}",
        attempts,
        last_error.unwrap_or_else(|| "unknown".to_string())
    )
}
