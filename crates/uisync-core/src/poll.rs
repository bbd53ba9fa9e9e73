//! Fixed-interval polling combinator.
//!
//! Every wait in the engine is the same shape: probe a condition, and if it
//! does not hold yet, sleep a fixed interval and probe again. This module
//! provides that loop once, as [`poll_until`], parameterized by an async
//! probe closure and a [`PollPolicy`].
//!
//! The loop is unbounded by default: the host offers no completion callback
//! for these conditions, and timeout policy belongs to the outer test
//! framework. [`PollPolicy::deadline`] exists for callers that do want a
//! bound; when it elapses, `poll_until` returns `Ok(None)` instead of
//! inventing an error type of its own.
//!
//! The probe runs before the first sleep, so a condition that already holds
//! is observed with zero sleeps.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Default interval between probes. Short enough for interactive UI
/// latency, long enough to keep CPU usage negligible.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Controls how [`poll_until`] paces and bounds its loop.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Sleep between probes.
    pub interval: Duration,
    /// Give up after this much time; `None` polls forever.
    pub deadline: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

impl PollPolicy {
    /// Policy with the given probe interval and no deadline.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Returns a copy of this policy with a deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Repeatedly evaluates `probe` until it yields a value.
///
/// `probe` returns `Ok(Some(value))` when the awaited condition holds,
/// `Ok(None)` to keep waiting, or `Err` to abort the wait. Probe errors
/// propagate unchanged.
///
/// Returns `Ok(None)` only when the policy's deadline elapsed first; with
/// the default unbounded policy the call either yields a value, yields a
/// probe error, or never returns.
pub async fn poll_until<T, E, F, Fut>(policy: PollPolicy, mut probe: F) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = Instant::now();
    loop {
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }
        if let Some(deadline) = policy.deadline {
            if started.elapsed() >= deadline {
                return Ok(None);
            }
        }
        sleep(policy.interval).await;
    }
}
