//! Call-scoped request options and their resolution against client defaults.
//!
//! Every service has its own options type wrapping the shared
//! [`RequestOptions`]. Resolution clones the caller's options (or starts from
//! an empty set), fills each unset field from the client, computes the
//! absolute deadline, and returns an effective snapshot owned by the single
//! operation that asked for it. Neither the caller's options nor the client
//! are ever written to.

mod blob;
mod queue;
mod table;

use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use serde::Serialize;

pub use self::blob::{BlobRequestOptions, BlobType, EffectiveBlobOptions};
pub use self::queue::{EffectiveQueueOptions, QueueRequestOptions};
pub use self::table::{EffectiveTableOptions, PayloadFormat, TableRequestOptions};
use crate::client::ServiceClient;
use crate::command::{RequestCommand, deadline_after};
use crate::location::LocationMode;
use crate::retry::RetryPolicy;
use crate::{Result, TRACING_TARGET_COMMAND};

/// Overrides shared by every service; `None` inherits the client default.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    location_mode: Option<LocationMode>,
    server_timeout: Option<Duration>,
    maximum_execution_time: Option<Duration>,
    operation_expiry_time: Option<Timestamp>,
}

impl RequestOptions {
    /// Returns the retry policy override.
    #[inline]
    pub fn retry_policy(&self) -> Option<&Arc<dyn RetryPolicy>> {
        self.retry_policy.as_ref()
    }

    /// Overrides the retry policy.
    pub fn set_retry_policy(&mut self, retry_policy: Option<Arc<dyn RetryPolicy>>) {
        self.retry_policy = retry_policy;
    }

    /// Returns the location mode override.
    #[inline]
    pub fn location_mode(&self) -> Option<LocationMode> {
        self.location_mode
    }

    /// Overrides the location mode.
    pub fn set_location_mode(&mut self, location_mode: Option<LocationMode>) {
        self.location_mode = location_mode;
    }

    /// Returns the per-attempt server timeout override.
    #[inline]
    pub fn server_timeout(&self) -> Option<Duration> {
        self.server_timeout
    }

    /// Overrides the per-attempt server timeout.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] outside `[0, 24 days]`; the
    /// previous value is kept.
    pub fn set_server_timeout(&mut self, server_timeout: Option<Duration>) -> Result<()> {
        stratus_core::bounds::check_timeout("server_timeout", server_timeout)?;
        self.server_timeout = server_timeout;
        Ok(())
    }

    /// Returns the cross-retry execution time override.
    #[inline]
    pub fn maximum_execution_time(&self) -> Option<Duration> {
        self.maximum_execution_time
    }

    /// Overrides the cross-retry execution time.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] outside `[0, 24 days]`; the
    /// previous value is kept.
    pub fn set_maximum_execution_time(
        &mut self,
        maximum_execution_time: Option<Duration>,
    ) -> Result<()> {
        stratus_core::bounds::check_timeout("maximum_execution_time", maximum_execution_time)?;
        self.maximum_execution_time = maximum_execution_time;
        Ok(())
    }

    /// Returns the explicit absolute deadline.
    #[inline]
    pub fn operation_expiry_time(&self) -> Option<Timestamp> {
        self.operation_expiry_time
    }

    /// Sets an explicit absolute deadline; it wins over the execution time.
    pub fn set_operation_expiry_time(&mut self, operation_expiry_time: Option<Timestamp>) {
        self.operation_expiry_time = operation_expiry_time;
    }

    /// Fills unset fields from `client` and computes the deadline at `now`.
    pub(crate) fn into_resolved(
        self,
        client: &ServiceClient,
        now: Timestamp,
    ) -> Result<ResolvedOptions> {
        let retry_policy = self
            .retry_policy
            .unwrap_or_else(|| Arc::clone(client.retry_policy()));
        let location_mode = self.location_mode.unwrap_or(client.location_mode());
        let server_timeout = self.server_timeout.or(client.server_timeout());
        let maximum_execution_time = self
            .maximum_execution_time
            .or(client.maximum_execution_time());

        let operation_expiry_time = match (self.operation_expiry_time, maximum_execution_time) {
            (Some(expiry), _) => Some(expiry),
            (None, Some(maximum)) => Some(deadline_after(now, maximum)?),
            (None, None) => None,
        };

        Ok(ResolvedOptions {
            retry_policy,
            location_mode,
            server_timeout,
            maximum_execution_time,
            operation_expiry_time,
        })
    }
}

/// Shared part of every effective snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedOptions {
    /// Retry policy the executor consults after a failed attempt.
    #[serde(skip)]
    pub retry_policy: Arc<dyn RetryPolicy>,
    /// Endpoint selection policy.
    pub location_mode: LocationMode,
    /// Per-attempt timeout enforced by the service.
    pub server_timeout: Option<Duration>,
    /// Cross-retry execution budget the deadline was derived from.
    pub maximum_execution_time: Option<Duration>,
    /// Absolute cross-retry deadline.
    pub operation_expiry_time: Option<Timestamp>,
}

impl ResolvedOptions {
    /// Writes location mode, server timeout and deadline onto `command`.
    ///
    /// An explicit expiry is copied verbatim; otherwise the deadline is
    /// derived from the execution time relative to now, which can be
    /// slightly later than the instant used at resolution.
    pub fn apply_to_command(&self, command: &mut RequestCommand) -> Result<()> {
        command.location_mode = self.location_mode;

        if let Some(server_timeout) = self.server_timeout {
            command.server_timeout_in_seconds =
                Some(u32::try_from(server_timeout.as_secs()).unwrap_or(u32::MAX));
        }

        if let Some(expiry) = self.operation_expiry_time {
            command.operation_expiry_time = Some(expiry);
        } else if let Some(maximum) = self.maximum_execution_time {
            command.operation_expiry_time = Some(deadline_after(Timestamp::now(), maximum)?);
        }

        tracing::trace!(
            target: TRACING_TARGET_COMMAND,
            location_mode = %command.location_mode,
            server_timeout_in_seconds = ?command.server_timeout_in_seconds,
            operation_expiry_time = ?command.operation_expiry_time,
            "Applied effective options to command"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use stratus_auth::{StorageCredentials, StorageService};

    use super::*;
    use crate::endpoint::StorageUri;
    use crate::platform::PlatformCapabilities;
    use crate::retry::NoRetry;

    fn client() -> ServiceClient {
        let uri = StorageUri::parse("https://acct.queue.core.windows.net", None).unwrap();
        ServiceClient::new(
            StorageService::Queue,
            uri,
            StorageCredentials::Anonymous,
            PlatformCapabilities::full(),
        )
    }

    fn command() -> RequestCommand {
        let uri = StorageUri::parse("https://acct.queue.core.windows.net/q", None).unwrap();
        RequestCommand::new(uri)
    }

    #[test]
    fn test_timeout_setter_round_trip() {
        let mut options = RequestOptions::default();
        options
            .set_server_timeout(Some(Duration::from_secs(30)))
            .unwrap();
        assert_eq!(options.server_timeout(), Some(Duration::from_secs(30)));

        options.set_server_timeout(None).unwrap();
        assert_eq!(options.server_timeout(), None);
    }

    #[test]
    fn test_rejected_timeout_keeps_previous_value() {
        let mut options = RequestOptions::default();
        options
            .set_maximum_execution_time(Some(Duration::from_secs(60)))
            .unwrap();

        let too_long = stratus_core::limits::MAX_TIMEOUT + Duration::from_secs(1);
        assert!(options.set_maximum_execution_time(Some(too_long)).is_err());
        assert_eq!(
            options.maximum_execution_time(),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn test_unset_fields_inherit_client_defaults() {
        let mut client = client();
        client.set_location_mode(LocationMode::SecondaryThenPrimary);
        client
            .set_server_timeout(Some(Duration::from_secs(15)))
            .unwrap();

        let resolved = RequestOptions::default()
            .into_resolved(&client, Timestamp::now())
            .unwrap();

        assert_eq!(resolved.location_mode, LocationMode::SecondaryThenPrimary);
        assert_eq!(resolved.server_timeout, Some(Duration::from_secs(15)));
        assert_eq!(resolved.maximum_execution_time, None);
        assert_eq!(resolved.operation_expiry_time, None);
        assert!(Arc::ptr_eq(&resolved.retry_policy, client.retry_policy()));
    }

    #[test]
    fn test_set_fields_win_over_client_defaults() {
        let mut client = client();
        client
            .set_server_timeout(Some(Duration::from_secs(15)))
            .unwrap();

        let policy: Arc<dyn RetryPolicy> = Arc::new(NoRetry);
        let mut options = RequestOptions::default();
        options.set_location_mode(Some(LocationMode::PrimaryThenSecondary));
        options.set_server_timeout(Some(Duration::ZERO)).unwrap();
        options.set_retry_policy(Some(Arc::clone(&policy)));

        let resolved = options.into_resolved(&client, Timestamp::now()).unwrap();
        assert_eq!(resolved.location_mode, LocationMode::PrimaryThenSecondary);
        assert_eq!(resolved.server_timeout, Some(Duration::ZERO));
        assert!(Arc::ptr_eq(&resolved.retry_policy, &policy));
    }

    #[test]
    fn test_deadline_from_execution_time() {
        let mut client = client();
        client
            .set_maximum_execution_time(Some(Duration::from_secs(10)))
            .unwrap();

        let now = Timestamp::now();
        let resolved = RequestOptions::default()
            .into_resolved(&client, now)
            .unwrap();

        assert_eq!(
            resolved.operation_expiry_time,
            Some(now + SignedDuration::from_secs(10))
        );
    }

    #[test]
    fn test_explicit_expiry_wins_verbatim() {
        let mut client = client();
        client
            .set_maximum_execution_time(Some(Duration::from_secs(10)))
            .unwrap();

        let expiry = Timestamp::from_second(1_900_000_000).unwrap();
        let mut options = RequestOptions::default();
        options.set_operation_expiry_time(Some(expiry));

        let resolved = options.into_resolved(&client, Timestamp::now()).unwrap();
        assert_eq!(resolved.operation_expiry_time, Some(expiry));
        assert_eq!(
            resolved.maximum_execution_time,
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_apply_writes_policy_fields() {
        let mut options = RequestOptions::default();
        options
            .set_server_timeout(Some(Duration::from_millis(90_900)))
            .unwrap();
        options.set_location_mode(Some(LocationMode::SecondaryOnly));
        let expiry = Timestamp::from_second(1_900_000_000).unwrap();
        options.set_operation_expiry_time(Some(expiry));

        let resolved = options.into_resolved(&client(), Timestamp::now()).unwrap();
        let mut command = command();
        resolved.apply_to_command(&mut command).unwrap();

        assert_eq!(command.location_mode, LocationMode::SecondaryOnly);
        assert_eq!(command.server_timeout_in_seconds, Some(90));
        assert_eq!(command.operation_expiry_time, Some(expiry));
    }

    #[test]
    fn test_apply_leaves_unset_fields_alone() {
        let resolved = RequestOptions::default()
            .into_resolved(&client(), Timestamp::now())
            .unwrap();

        let mut command = command();
        command.server_timeout_in_seconds = Some(7);
        resolved.apply_to_command(&mut command).unwrap();

        assert_eq!(command.server_timeout_in_seconds, Some(7));
        assert_eq!(command.operation_expiry_time, None);
    }

    #[test]
    fn test_apply_derives_deadline_at_apply_time() {
        let mut resolved = RequestOptions::default()
            .into_resolved(&client(), Timestamp::now())
            .unwrap();
        resolved.maximum_execution_time = Some(Duration::from_secs(5));

        let before = Timestamp::now();
        let mut command = command();
        resolved.apply_to_command(&mut command).unwrap();
        let after = Timestamp::now();

        let expiry = command.operation_expiry_time.unwrap();
        assert!(expiry >= before + SignedDuration::from_secs(5));
        assert!(expiry <= after + SignedDuration::from_secs(5));
    }
}
