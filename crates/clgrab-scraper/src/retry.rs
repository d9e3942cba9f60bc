//! Fixed-delay retry wrapper around a single HTTP call.
//!
//! The marketplace endpoints fail transiently often enough that every fetch
//! runs through this wrapper: a bounded number of attempts with a constant
//! delay between them. No jitter, no backoff growth, no circuit breaking.
//! Retries never span more than one HTTP call; a failed fetch surfaces to
//! the caller rather than restarting the pipeline.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transport or parse hiccup worth
/// another attempt.
///
/// Retriable errors:
/// - [`ScraperError::Http`]: network-level failure (connection reset, timeout).
/// - [`ScraperError::UnexpectedStatus`]: non-2xx whose body was unusable.
/// - [`ScraperError::EmptyBody`]: 2xx with nothing in it.
/// - [`ScraperError::Deserialize`]: truncated or garbled JSON; the endpoints
///   are observed to serve partial bodies under load.
///
/// Non-retriable errors (propagated immediately):
/// - [`ScraperError::Decode`]: the payload parsed but its shape is wrong;
///   refetching returns the same payload.
/// - [`ScraperError::InvalidUrl`]: caller bug, not a transient condition.
fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::Http(_)
            | ScraperError::UnexpectedStatus { .. }
            | ScraperError::EmptyBody { .. }
            | ScraperError::Deserialize { .. }
    )
}

/// Executes `operation` up to `attempts` times total, sleeping `delay_secs`
/// between attempts on retriable errors.
///
/// On success the result is returned immediately. Non-retriable errors are
/// returned without sleeping. When every attempt fails, the last error is
/// returned. `attempts` is clamped to at least 1.
pub(crate) async fn retry_fixed_delay<T, F, Fut>(
    attempts: u32,
    delay_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= attempts {
                    return Err(err);
                }
                tracing::warn!(
                    attempt,
                    attempts,
                    delay_secs,
                    error = %err,
                    "transient fetch error, retrying after fixed delay"
                );
            }
        }

        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
