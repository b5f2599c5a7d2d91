//! Bounded retry with exponential backoff for outbound HTTP calls
//!
//! **Backoff Strategy:**
//! - Initial delay: 250ms
//! - Max delay: 4000ms
//! - Multiplier: 2.0 (exponential)
//! - A server-provided `Retry-After` replaces the computed delay (still capped)

use std::future::Future;
use std::time::{Duration, Instant};

/// Outcome of one failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// Worth retrying: timeout, connect failure, 429, 5xx
    Transient {
        reason: String,
        retry_after: Option<Duration>,
    },
    /// Retrying cannot help: auth rejected, other 4xx, unparseable body
    Fatal(String),
}

impl AttemptError {
    pub fn transient(reason: impl Into<String>) -> Self {
        AttemptError::Transient {
            reason: reason.into(),
            retry_after: None,
        }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        AttemptError::Fatal(reason.into())
    }

    fn reason(&self) -> &str {
        match self {
            AttemptError::Transient { reason, .. } => reason,
            AttemptError::Fatal(reason) => reason,
        }
    }
}

/// Retry limits
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_millis(4000),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Run `operation` until it succeeds, fails fatally, or retries run out
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g., "catalog search")
/// * `policy` - Attempt budget and backoff bounds
/// * `operation` - Async closure performing one attempt
///
/// # Returns
/// The successful value, or the reason of the last failed attempt
pub async fn retry_transient<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let start_time = Instant::now();
    let mut attempt = 0u32;
    let mut backoff = policy.initial_backoff;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Request succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(AttemptError::Fatal(reason)) => {
                return Err(reason);
            }
            Err(err @ AttemptError::Transient { .. }) => {
                if attempt > policy.max_retries {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        reason = err.reason(),
                        "Request failed: retries exhausted"
                    );
                    return Err(format!(
                        "{} after {} attempts",
                        err.reason(),
                        attempt
                    ));
                }

                let delay = match &err {
                    AttemptError::Transient {
                        retry_after: Some(wait),
                        ..
                    } => (*wait).min(policy.max_backoff),
                    _ => backoff,
                };

                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = err.reason(),
                    "Transient failure, retrying"
                );

                tokio::time::sleep(delay).await;
                backoff = (backoff * 2).min(policy.max_backoff);
            }
        }
    }
}
