//! The retry policy slot.
//!
//! Backoff algorithms live with the transport; this module only fixes the
//! interface a resolved snapshot hands to it.

use std::fmt;
use std::time::Duration;

use crate::endpoint::StorageLocation;

/// What the executor knows about the attempt that just failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAttempt {
    /// Number of retries already made (0 after the first failure).
    pub retry_count: u32,
    /// HTTP status of the failed attempt, if a response arrived.
    pub last_status_code: Option<u16>,
    /// Where the failed attempt was sent.
    pub last_location: StorageLocation,
}

impl RetryAttempt {
    /// Describes the first failure at `location`.
    pub fn first(location: StorageLocation) -> Self {
        Self {
            retry_count: 0,
            last_status_code: None,
            last_location: location,
        }
    }

    /// Sets the status code of the failed attempt.
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.last_status_code = Some(status_code);
        self
    }
}

/// Decides whether and when a failed attempt is retried.
pub trait RetryPolicy: fmt::Debug + Send + Sync {
    /// Returns the delay before the next attempt, or `None` to stop.
    fn evaluate(&self, attempt: &RetryAttempt) -> Option<Duration>;
}

/// Never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn evaluate(&self, _attempt: &RetryAttempt) -> Option<Duration> {
        None
    }
}
