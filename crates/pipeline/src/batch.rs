//! Batch pacing
//!
//! With `batchSize = k > 0` render tasks are dispatched in groups of `k`,
//! and the dispatcher sleeps for the batch interval before each group after
//! the first. The pause throttles dispatch only; it does not wait for the
//! previous group to finish.

use std::time::Duration;

/// Interval used when `batchInterval` is missing or malformed
pub const DEFAULT_BATCH_INTERVAL: Duration = Duration::from_secs(1);

/// How render tasks of one invocation are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Dispatch every task at once
    Unbounded,
    /// Dispatch `size` tasks, then pause for `interval`
    Paced { size: usize, interval: Duration },
}

impl BatchPolicy {
    /// Resolve the policy for an event
    ///
    /// The interval is parsed here, once; a malformed value falls back to
    /// `DEFAULT_BATCH_INTERVAL` with a warning.
    pub fn from_event(event: &str, batch_size: i64, batch_interval: &str) -> Self {
        if batch_size <= 0 {
            return Self::Unbounded;
        }

        let interval = match humantime::parse_duration(batch_interval.trim()) {
            Ok(interval) => interval,
            Err(e) => {
                tracing::warn!(
                    event = %event,
                    batch_interval = %batch_interval,
                    error = %e,
                    fallback = ?DEFAULT_BATCH_INTERVAL,
                    "invalid batch interval, using default"
                );
                DEFAULT_BATCH_INTERVAL
            }
        };

        let size = usize::try_from(batch_size).unwrap_or(usize::MAX);
        tracing::debug!(event = %event, batch_size = size, interval = ?interval, "batching enabled");
        Self::Paced { size, interval }
    }

    /// Pause required before dispatching task `index`
    pub fn delay_before(&self, index: usize) -> Option<Duration> {
        match *self {
            Self::Paced { size, interval } if index > 0 && index % size == 0 => Some(interval),
            _ => None,
        }
    }

    /// Number of dispatch groups for `n` tasks
    pub fn groups(&self, n: usize) -> usize {
        match *self {
            Self::Unbounded => usize::from(n > 0),
            Self::Paced { size, .. } => n.div_ceil(size),
        }
    }
}
