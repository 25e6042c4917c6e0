//! Bounded retry with an explicit policy value
//!
//! The policy is a plain value consumed by a generic combinator, so retry
//! behavior is testable and reusable instead of being inlined as
//! loop-with-sleep at each call site.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// How the sleep between attempts is derived from the base delay and the
/// zero-based index of the attempt that just failed
pub type BackoffFn = fn(Duration, u32) -> Duration;

fn fixed_backoff(delay: Duration, _attempt: u32) -> Duration {
    delay
}

/// Retry policy: bounded attempts with a delay between them
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: BackoffFn,
}

impl RetryPolicy {
    /// Fixed delay between attempts
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: fixed_backoff,
        }
    }

    /// Policy for authenticating freshly provisioned directory accounts,
    /// sized for LDAP propagation delay: 5 attempts, 500ms apart.
    pub fn directory_propagation() -> Self {
        Self::fixed(5, Duration::from_millis(500))
    }
}

/// Invoke `op` until it succeeds or the policy is exhausted. Exhaustion
/// yields [`E2eError::RetriesExhausted`] wrapping the final failure.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let mut last: Option<E2eError> = None;

    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            tokio::time::sleep((policy.backoff)(policy.delay, attempt - 1)).await;
        }
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!(attempt = attempt + 1, max = policy.max_attempts, error = %e, "attempt failed");
                last = Some(e);
            }
        }
    }

    Err(E2eError::RetriesExhausted {
        attempts: policy.max_attempts,
        last: Box::new(last.unwrap_or(E2eError::NoToken)),
    })
}
