use derive_more::{Deref, DerefMut};
use serde::Serialize;
use stratus_auth::{StorageCredentials, StorageService};
use stratus_core::bounds;
use stratus_core::limits::PAGE_SIZE;

use super::ServiceClient;
use crate::command::{PreparedOperation, RequestCommand};
use crate::endpoint::StorageUri;
use crate::listing::ListBlobsRequest;
use crate::location::LocationMode;
use crate::naming;
use crate::options::{BlobRequestOptions, BlobType, EffectiveBlobOptions};
use crate::platform::PlatformCapabilities;
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// Default hierarchy delimiter for blob listings.
pub const DEFAULT_DELIMITER: &str = "/";

/// How an upload is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UploadStrategy {
    /// One request carrying the whole content.
    SinglePut,
    /// Staged blocks followed by a commit.
    Blocks {
        /// Blocks staged concurrently.
        parallelism: u32,
    },
    /// 512-byte aligned page writes.
    Pages {
        /// Page ranges written concurrently.
        parallelism: u32,
    },
    /// Sequential appends.
    AppendBlocks,
}

/// A prepared upload and the strategy chosen for it.
#[derive(Debug, Clone, Serialize)]
pub struct UploadPlan {
    /// The prepared operation.
    #[serde(flatten)]
    pub operation: PreparedOperation<EffectiveBlobOptions>,
    /// How the content is sent.
    pub strategy: UploadStrategy,
    /// Content length in bytes.
    pub length: u64,
}

/// Client for the blob service.
#[derive(Debug, Clone, Deref, DerefMut)]
pub struct BlobServiceClient {
    #[deref]
    #[deref_mut]
    client: ServiceClient,
    parallel_operation_thread_count: u32,
    single_blob_upload_threshold_in_bytes: u64,
    default_delimiter: String,
}

impl BlobServiceClient {
    /// Creates a blob client with default knobs.
    pub fn new(
        storage_uri: StorageUri,
        credentials: StorageCredentials,
        capabilities: PlatformCapabilities,
    ) -> Self {
        Self {
            client: ServiceClient::new(StorageService::Blob, storage_uri, credentials, capabilities),
            parallel_operation_thread_count:
                stratus_core::limits::DEFAULT_PARALLEL_OPERATION_THREAD_COUNT,
            single_blob_upload_threshold_in_bytes:
                stratus_core::limits::DEFAULT_SINGLE_BLOB_UPLOAD_THRESHOLD,
            default_delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }

    /// Default number of concurrent block uploads.
    #[inline]
    pub fn parallel_operation_thread_count(&self) -> u32 {
        self.parallel_operation_thread_count
    }

    /// Sets the default number of concurrent block uploads.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] outside `[1, 64]`.
    pub fn set_parallel_operation_thread_count(&mut self, count: u32) -> Result<()> {
        bounds::check_parallel_operation_thread_count(count)?;
        self.parallel_operation_thread_count = count;
        Ok(())
    }

    /// Largest upload sent as a single request.
    #[inline]
    pub fn single_blob_upload_threshold_in_bytes(&self) -> u64 {
        self.single_blob_upload_threshold_in_bytes
    }

    /// Sets the largest upload sent as a single request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] outside `[1 MiB, 64 MiB]`.
    pub fn set_single_blob_upload_threshold_in_bytes(&mut self, bytes: u64) -> Result<()> {
        bounds::check_single_blob_upload_threshold(bytes)?;
        self.single_blob_upload_threshold_in_bytes = bytes;
        Ok(())
    }

    /// Hierarchy delimiter of non-flat listings.
    #[inline]
    pub fn default_delimiter(&self) -> &str {
        &self.default_delimiter
    }

    /// Sets the hierarchy delimiter of non-flat listings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] for an empty delimiter.
    pub fn set_default_delimiter(&mut self, delimiter: impl Into<String>) -> Result<()> {
        let delimiter = delimiter.into();
        bounds::assert_not_empty("default_delimiter", &delimiter)?;
        self.default_delimiter = delimiter;
        Ok(())
    }

    /// Prepares a listing of the blobs under a flat user path.
    ///
    /// `prefix` is split by [`crate::listing::parse_user_prefix`]; a flat
    /// listing sends no delimiter.
    pub fn prepare_list_blobs(
        &self,
        prefix: &str,
        flat: bool,
        options: Option<&BlobRequestOptions>,
    ) -> Result<PreparedOperation<EffectiveBlobOptions>> {
        let delimiter = (!flat).then(|| self.default_delimiter.clone());
        let request = ListBlobsRequest::from_user_prefix(prefix, delimiter);
        naming::validate_container_name(&request.container)?;

        let effective = BlobRequestOptions::resolve(options, self, BlobType::Unspecified)?;
        self.storage_uri()
            .validate_location_mode(effective.location_mode)?;

        let mut command = request.query().into_iter().fold(
            RequestCommand::new(self.storage_uri().append_path(&request.container)?),
            |command, (name, value)| command.with_query(name, value),
        );
        effective.apply_to_command(&mut command)?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            container = %request.container,
            prefix = request.prefix.as_deref(),
            flat,
            "Prepared blob listing"
        );

        Ok(PreparedOperation::new(
            effective,
            command,
            self.canonicalizer(),
        ))
    }

    /// Prepares an upload of `length` bytes to `container/blob_name`.
    ///
    /// Block blobs up to the effective threshold go out as one request and
    /// larger ones as staged blocks. Writes always target the primary
    /// endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an unspecified blob type, a
    /// page blob length that is not page aligned, or a secondary-only
    /// location mode.
    pub fn prepare_upload(
        &self,
        container: &str,
        blob_name: &str,
        blob_type: BlobType,
        length: u64,
        options: Option<&BlobRequestOptions>,
    ) -> Result<UploadPlan> {
        naming::validate_container_name(container)?;
        naming::validate_blob_name(blob_name)?;

        if blob_type == BlobType::Unspecified {
            return Err(Error::invalid_argument(
                "blob_type",
                "uploads need a concrete blob type",
            ));
        }
        if blob_type == BlobType::PageBlob && length % PAGE_SIZE != 0 {
            return Err(Error::invalid_argument(
                "length",
                format!("page blob length {length} is not a multiple of {PAGE_SIZE}"),
            ));
        }

        let effective = BlobRequestOptions::resolve(options, self, blob_type)?;
        if effective.location_mode == LocationMode::SecondaryOnly {
            return Err(Error::invalid_argument(
                "location_mode",
                "writes cannot target the secondary endpoint",
            ));
        }

        let strategy = match blob_type {
            BlobType::BlockBlob if length <= effective.single_blob_upload_threshold_in_bytes => {
                UploadStrategy::SinglePut
            }
            BlobType::BlockBlob => UploadStrategy::Blocks {
                parallelism: effective.parallel_operation_thread_count,
            },
            BlobType::PageBlob => UploadStrategy::Pages {
                parallelism: effective.parallel_operation_thread_count,
            },
            BlobType::AppendBlob | BlobType::Unspecified => UploadStrategy::AppendBlocks,
        };

        let uri = self
            .storage_uri()
            .append_path(&format!("{container}/{blob_name}"))?;
        let mut command = RequestCommand::new(uri);
        effective.apply_to_command(&mut command)?;
        // The secondary is read-only.
        command.location_mode = LocationMode::PrimaryOnly;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            container,
            blob_name,
            %blob_type,
            length,
            strategy = ?strategy,
            "Prepared blob upload"
        );

        Ok(UploadPlan {
            operation: PreparedOperation::new(effective, command, self.canonicalizer()),
            strategy,
            length,
        })
    }
}
