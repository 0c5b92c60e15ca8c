use derive_more::{Deref, DerefMut};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{RequestOptions, ResolvedOptions};
use crate::client::BlobServiceClient;
use crate::platform::PlatformCapabilities;
use crate::{Error, Result, TRACING_TARGET_OPTIONS};

/// Kind of blob an operation targets.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr
)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BlobType {
    /// Blob assembled from committed blocks.
    BlockBlob,
    /// Random-access blob made of 512-byte pages.
    PageBlob,
    /// Blob that only grows at its end.
    AppendBlob,
    /// Type not known to the caller.
    #[default]
    Unspecified,
}

/// Per-call overrides for blob operations.
#[derive(Debug, Clone, Default, Deref, DerefMut)]
pub struct BlobRequestOptions {
    #[deref]
    #[deref_mut]
    common: RequestOptions,
    parallel_operation_thread_count: Option<u32>,
    single_blob_upload_threshold_in_bytes: Option<u64>,
    use_transactional_md5: Option<bool>,
    store_blob_content_md5: Option<bool>,
    disable_content_md5_validation: Option<bool>,
    absorb_conditional_errors_on_retry: Option<bool>,
}

impl BlobRequestOptions {
    /// Returns the parallel upload thread count override.
    #[inline]
    pub fn parallel_operation_thread_count(&self) -> Option<u32> {
        self.parallel_operation_thread_count
    }

    /// Overrides the parallel upload thread count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] outside `[1, 64]`.
    pub fn set_parallel_operation_thread_count(&mut self, count: Option<u32>) -> Result<()> {
        if let Some(count) = count {
            stratus_core::bounds::check_parallel_operation_thread_count(count)?;
        }
        self.parallel_operation_thread_count = count;
        Ok(())
    }

    /// Returns the single-shot upload threshold override.
    #[inline]
    pub fn single_blob_upload_threshold_in_bytes(&self) -> Option<u64> {
        self.single_blob_upload_threshold_in_bytes
    }

    /// Overrides the single-shot upload threshold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] outside `[1 MiB, 64 MiB]`.
    pub fn set_single_blob_upload_threshold_in_bytes(&mut self, bytes: Option<u64>) -> Result<()> {
        if let Some(bytes) = bytes {
            stratus_core::bounds::check_single_blob_upload_threshold(bytes)?;
        }
        self.single_blob_upload_threshold_in_bytes = bytes;
        Ok(())
    }

    /// Returns whether a per-request MD5 is sent, if overridden.
    #[inline]
    pub fn use_transactional_md5(&self) -> Option<bool> {
        self.use_transactional_md5
    }

    /// Overrides whether a per-request MD5 is sent.
    pub fn set_use_transactional_md5(&mut self, value: Option<bool>) {
        self.use_transactional_md5 = value;
    }

    /// Returns whether the blob's content MD5 is stored, if overridden.
    #[inline]
    pub fn store_blob_content_md5(&self) -> Option<bool> {
        self.store_blob_content_md5
    }

    /// Overrides whether the blob's content MD5 is stored.
    pub fn set_store_blob_content_md5(&mut self, value: Option<bool>) {
        self.store_blob_content_md5 = value;
    }

    /// Returns whether download MD5 validation is skipped, if overridden.
    #[inline]
    pub fn disable_content_md5_validation(&self) -> Option<bool> {
        self.disable_content_md5_validation
    }

    /// Overrides whether download MD5 validation is skipped.
    pub fn set_disable_content_md5_validation(&mut self, value: Option<bool>) {
        self.disable_content_md5_validation = value;
    }

    /// Returns whether conditional failures on retries are absorbed, if overridden.
    #[inline]
    pub fn absorb_conditional_errors_on_retry(&self) -> Option<bool> {
        self.absorb_conditional_errors_on_retry
    }

    /// Overrides whether conditional failures on retries are absorbed.
    pub fn set_absorb_conditional_errors_on_retry(&mut self, value: Option<bool>) {
        self.absorb_conditional_errors_on_retry = value;
    }

    /// Resolves `options` against `client` for an operation on a `blob_type` blob.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOnPlatform`] when the caller explicitly
    /// asks for content MD5 on a platform without it, and
    /// [`Error::DeadlineOverflow`] when the deadline is unrepresentable.
    pub fn resolve(
        options: Option<&Self>,
        client: &BlobServiceClient,
        blob_type: BlobType,
    ) -> Result<EffectiveBlobOptions> {
        let modified = options.cloned().unwrap_or_default();
        let capabilities = client.capabilities();
        modified.check_platform(capabilities)?;

        let common = modified.common.into_resolved(client, Timestamp::now())?;
        let mut effective = EffectiveBlobOptions {
            common,
            blob_type,
            parallel_operation_thread_count: modified
                .parallel_operation_thread_count
                .unwrap_or(client.parallel_operation_thread_count()),
            single_blob_upload_threshold_in_bytes: modified
                .single_blob_upload_threshold_in_bytes
                .unwrap_or(client.single_blob_upload_threshold_in_bytes()),
            use_transactional_md5: modified.use_transactional_md5.unwrap_or(false),
            store_blob_content_md5: modified
                .store_blob_content_md5
                .unwrap_or(blob_type == BlobType::BlockBlob),
            disable_content_md5_validation: modified
                .disable_content_md5_validation
                .unwrap_or(false),
            absorb_conditional_errors_on_retry: modified
                .absorb_conditional_errors_on_retry
                .unwrap_or(false),
        };

        if !capabilities.supports_content_md5() {
            effective.use_transactional_md5 = false;
            effective.store_blob_content_md5 = false;
            effective.disable_content_md5_validation = true;
        }

        tracing::debug!(
            target: TRACING_TARGET_OPTIONS,
            service = "blob",
            %blob_type,
            location_mode = %effective.location_mode,
            server_timeout = ?effective.server_timeout,
            operation_expiry_time = ?effective.operation_expiry_time,
            parallel_operation_thread_count = effective.parallel_operation_thread_count,
            "Resolved request options"
        );

        Ok(effective)
    }

    fn check_platform(&self, capabilities: PlatformCapabilities) -> Result<()> {
        if capabilities.supports_content_md5() {
            return Ok(());
        }

        let explicit = [
            ("use_transactional_md5", self.use_transactional_md5 == Some(true)),
            ("store_blob_content_md5", self.store_blob_content_md5 == Some(true)),
            (
                "disable_content_md5_validation",
                self.disable_content_md5_validation == Some(false),
            ),
        ];

        match explicit.into_iter().find(|(_, requested)| *requested) {
            Some((feature, _)) => {
                tracing::warn!(
                    target: TRACING_TARGET_OPTIONS,
                    feature,
                    "Content MD5 requested on a platform without it"
                );
                Err(Error::unsupported_on_platform(feature))
            }
            None => Ok(()),
        }
    }
}

/// Fully populated options for one blob operation.
#[derive(Debug, Clone, Serialize, Deref)]
pub struct EffectiveBlobOptions {
    /// Options shared by every service.
    #[deref]
    #[serde(flatten)]
    pub common: ResolvedOptions,
    /// Blob type the defaults were chosen for.
    pub blob_type: BlobType,
    /// Concurrent block or page uploads.
    pub parallel_operation_thread_count: u32,
    /// Largest upload sent as a single request.
    pub single_blob_upload_threshold_in_bytes: u64,
    /// Send a per-request MD5.
    pub use_transactional_md5: bool,
    /// Store the blob's content MD5.
    pub store_blob_content_md5: bool,
    /// Skip MD5 validation on download.
    pub disable_content_md5_validation: bool,
    /// Treat conditional failures on retries as success.
    pub absorb_conditional_errors_on_retry: bool,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use stratus_auth::StorageCredentials;

    use super::*;
    use crate::endpoint::StorageUri;
    use crate::location::LocationMode;

    fn client(capabilities: PlatformCapabilities) -> BlobServiceClient {
        let uri = StorageUri::parse("https://acct.blob.core.windows.net", None).unwrap();
        BlobServiceClient::new(uri, StorageCredentials::Anonymous, capabilities)
    }

    #[test]
    fn test_defaults_without_options() {
        let client = client(PlatformCapabilities::full());
        let effective = BlobRequestOptions::resolve(None, &client, BlobType::Unspecified).unwrap();

        assert_eq!(effective.location_mode, LocationMode::PrimaryOnly);
        assert_eq!(effective.parallel_operation_thread_count, 1);
        assert_eq!(
            effective.single_blob_upload_threshold_in_bytes,
            32 * 1024 * 1024
        );
        assert!(!effective.use_transactional_md5);
        assert!(!effective.store_blob_content_md5);
        assert!(!effective.disable_content_md5_validation);
        assert!(!effective.absorb_conditional_errors_on_retry);
    }

    #[test]
    fn test_store_md5_defaults_by_blob_type() {
        let client = client(PlatformCapabilities::full());
        for (blob_type, expected) in [
            (BlobType::BlockBlob, true),
            (BlobType::PageBlob, false),
            (BlobType::AppendBlob, false),
            (BlobType::Unspecified, false),
        ] {
            let effective = BlobRequestOptions::resolve(None, &client, blob_type).unwrap();
            assert_eq!(effective.store_blob_content_md5, expected, "{blob_type}");
        }

        let mut options = BlobRequestOptions::default();
        options.set_store_blob_content_md5(Some(false));
        let effective =
            BlobRequestOptions::resolve(Some(&options), &client, BlobType::BlockBlob).unwrap();
        assert!(!effective.store_blob_content_md5);
    }

    #[test]
    fn test_restricted_platform_forces_md5_off() {
        let client = client(PlatformCapabilities::restricted());
        let effective = BlobRequestOptions::resolve(None, &client, BlobType::BlockBlob).unwrap();

        assert!(!effective.use_transactional_md5);
        assert!(!effective.store_blob_content_md5);
        assert!(effective.disable_content_md5_validation);
    }

    #[test]
    fn test_restricted_platform_rejects_explicit_md5() {
        let client = client(PlatformCapabilities::restricted());

        let mut options = BlobRequestOptions::default();
        options.set_use_transactional_md5(Some(true));
        assert!(matches!(
            BlobRequestOptions::resolve(Some(&options), &client, BlobType::BlockBlob),
            Err(Error::UnsupportedOnPlatform {
                feature: "use_transactional_md5"
            })
        ));

        let mut options = BlobRequestOptions::default();
        options.set_disable_content_md5_validation(Some(false));
        assert!(matches!(
            BlobRequestOptions::resolve(Some(&options), &client, BlobType::PageBlob),
            Err(Error::UnsupportedOnPlatform {
                feature: "disable_content_md5_validation"
            })
        ));

        let mut options = BlobRequestOptions::default();
        options.set_store_blob_content_md5(Some(false));
        assert!(BlobRequestOptions::resolve(Some(&options), &client, BlobType::BlockBlob).is_ok());
    }

    #[test]
    fn test_resolution_does_not_mutate_options() {
        let mut client = client(PlatformCapabilities::full());
        client
            .set_maximum_execution_time(Some(Duration::from_secs(30)))
            .unwrap();

        let mut options = BlobRequestOptions::default();
        options.set_parallel_operation_thread_count(Some(8)).unwrap();

        let _ = BlobRequestOptions::resolve(Some(&options), &client, BlobType::BlockBlob).unwrap();

        assert_eq!(options.parallel_operation_thread_count(), Some(8));
        assert_eq!(options.single_blob_upload_threshold_in_bytes(), None);
        assert_eq!(options.maximum_execution_time(), None);
        assert_eq!(options.operation_expiry_time(), None);
        assert_eq!(options.location_mode(), None);
        assert!(options.retry_policy().is_none());
        assert_eq!(options.store_blob_content_md5(), None);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut client = client(PlatformCapabilities::full());
        client
            .set_maximum_execution_time(Some(Duration::from_secs(30)))
            .unwrap();

        let mut options = BlobRequestOptions::default();
        options.set_location_mode(Some(LocationMode::PrimaryThenSecondary));

        let first = BlobRequestOptions::resolve(Some(&options), &client, BlobType::PageBlob).unwrap();
        let second =
            BlobRequestOptions::resolve(Some(&options), &client, BlobType::PageBlob).unwrap();

        assert_eq!(first.location_mode, second.location_mode);
        assert_eq!(first.server_timeout, second.server_timeout);
        assert_eq!(first.maximum_execution_time, second.maximum_execution_time);
        assert_eq!(
            first.parallel_operation_thread_count,
            second.parallel_operation_thread_count
        );
        assert_eq!(first.store_blob_content_md5, second.store_blob_content_md5);
        assert!(first.operation_expiry_time <= second.operation_expiry_time);
    }

    #[test]
    fn test_rejected_thread_count_keeps_previous() {
        let mut options = BlobRequestOptions::default();
        options.set_parallel_operation_thread_count(Some(64)).unwrap();

        assert!(options.set_parallel_operation_thread_count(Some(0)).is_err());
        assert!(options.set_parallel_operation_thread_count(Some(65)).is_err());
        assert_eq!(options.parallel_operation_thread_count(), Some(64));

        assert!(
            options
                .set_single_blob_upload_threshold_in_bytes(Some(1024))
                .is_err()
        );
        assert_eq!(options.single_blob_upload_threshold_in_bytes(), None);
    }

    #[test]
    fn test_client_changes_do_not_affect_snapshot() {
        let mut client = client(PlatformCapabilities::full());
        let before = BlobRequestOptions::resolve(None, &client, BlobType::BlockBlob).unwrap();

        client.set_location_mode(LocationMode::SecondaryOnly);
        client.set_parallel_operation_thread_count(4).unwrap();

        assert_eq!(before.location_mode, LocationMode::PrimaryOnly);
        assert_eq!(before.parallel_operation_thread_count, 1);
    }
}
