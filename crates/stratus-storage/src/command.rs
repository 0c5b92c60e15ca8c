//! The outgoing command handed to the transport.

use std::time::Duration;

use jiff::Timestamp;
use serde::Serialize;
use stratus_auth::{Canonicalizer, SignableRequest, StorageCredentials};
use url::Url;

use crate::endpoint::{StorageLocation, StorageUri};
use crate::location::LocationMode;
use crate::retry::{RetryAttempt, RetryPolicy};
use crate::{Error, Result, TRACING_TARGET_COMMAND};

/// Returns `now + duration`.
///
/// # Errors
///
/// Returns [`Error::DeadlineOverflow`] when the sum leaves the supported
/// timestamp range.
pub(crate) fn deadline_after(now: Timestamp, duration: Duration) -> Result<Timestamp> {
    Ok(now.checked_add(duration)?)
}

/// A single logical operation, possibly executed as several attempts.
///
/// The applier writes the policy fields; the executor reads them on every
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestCommand {
    /// Resource addressed on both locations.
    pub storage_uri: StorageUri,
    /// Operation query parameters, in insertion order.
    pub query: Vec<(String, String)>,
    /// Endpoint selection policy.
    pub location_mode: LocationMode,
    /// Per-attempt timeout sent to the service as `timeout=<secs>`.
    pub server_timeout_in_seconds: Option<u32>,
    /// Absolute cross-retry deadline.
    pub operation_expiry_time: Option<Timestamp>,
    #[serde(skip)]
    location: Option<StorageLocation>,
}

impl RequestCommand {
    /// Creates a command for `storage_uri` with no policy applied.
    pub fn new(storage_uri: StorageUri) -> Self {
        Self {
            storage_uri,
            query: Vec::new(),
            location_mode: LocationMode::default(),
            server_timeout_in_seconds: None,
            operation_expiry_time: None,
            location: None,
        }
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Returns the location the next attempt targets.
    pub fn current_location(&self) -> StorageLocation {
        self.location
            .unwrap_or_else(|| self.location_mode.initial_location())
    }

    /// Moves to the location of the following attempt and returns it.
    pub fn advance_location(&mut self) -> StorageLocation {
        let next = self.location_mode.next_location(self.current_location());
        self.location = Some(next);
        next
    }

    /// Returns the time left before the deadline, zero once it passed.
    ///
    /// Returns `None` without a deadline.
    pub fn remaining(&self, now: Timestamp) -> Option<Duration> {
        let expiry = self.operation_expiry_time?;
        Some(Duration::try_from(expiry.duration_since(now)).unwrap_or(Duration::ZERO))
    }

    /// Returns whether the deadline has passed.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.operation_expiry_time
            .is_some_and(|expiry| expiry <= now)
    }

    /// Asks `policy` for the delay before the next attempt.
    ///
    /// The deadline is terminal: once it has passed, or when the delay
    /// would cross it, no retry happens whatever the policy says.
    pub fn retry_delay(
        &self,
        policy: &dyn RetryPolicy,
        attempt: &RetryAttempt,
        now: Timestamp,
    ) -> Option<Duration> {
        if self.is_expired(now) {
            tracing::debug!(
                target: TRACING_TARGET_COMMAND,
                retry_count = attempt.retry_count,
                "Operation deadline passed, not retrying"
            );
            return None;
        }

        let delay = policy.evaluate(attempt)?;
        if let Some(remaining) = self.remaining(now)
            && delay >= remaining
        {
            tracing::debug!(
                target: TRACING_TARGET_COMMAND,
                retry_count = attempt.retry_count,
                delay_ms = delay.as_millis(),
                remaining_ms = remaining.as_millis(),
                "Retry delay would cross the operation deadline"
            );
            return None;
        }

        Some(delay)
    }

    /// Builds the URL for an attempt at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `location` is not configured.
    pub fn request_url(&self, location: StorageLocation) -> Result<Url> {
        let mut url = self.storage_uri.get(location).cloned().ok_or_else(|| {
            Error::invalid_argument("location", format!("no {location} endpoint configured"))
        })?;

        if !self.query.is_empty() || self.server_timeout_in_seconds.is_some() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
            if let Some(timeout) = self.server_timeout_in_seconds {
                pairs.append_pair("timeout", &timeout.to_string());
            }
        }

        Ok(url)
    }
}

/// Effective options and the command built from them for one operation.
///
/// The canonicalizer is fixed when the operation is prepared; later scheme
/// changes on the client do not affect how its attempts are signed.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedOperation<O> {
    /// The effective snapshot the operation runs under.
    pub options: O,
    /// The command with policy fields applied.
    pub command: RequestCommand,
    #[serde(skip)]
    canonicalizer: &'static dyn Canonicalizer,
}

impl<O> PreparedOperation<O> {
    /// Bundles a snapshot, its command and the canonicalizer selected for it.
    pub fn new(
        options: O,
        command: RequestCommand,
        canonicalizer: &'static dyn Canonicalizer,
    ) -> Self {
        Self {
            options,
            command,
            canonicalizer,
        }
    }

    /// Canonicalizer every attempt of this operation is signed with.
    #[inline]
    pub fn canonicalizer(&self) -> &'static dyn Canonicalizer {
        self.canonicalizer
    }

    /// Signs one attempt's `request` with `credentials`.
    pub fn authorize(&self, credentials: &StorageCredentials, request: &mut SignableRequest) {
        credentials.authorize(request, self.canonicalizer);
    }
}
