//! Client configuration loadable from flags, environment or files.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use stratus_auth::{AuthenticationScheme, StorageCredentials};

use super::{BlobServiceClient, QueueServiceClient, ServiceClient, TableServiceClient};
use crate::endpoint::StorageUri;
use crate::location::LocationMode;
use crate::options::PayloadFormat;
use crate::platform::PlatformCapabilities;
use crate::{Error, Result};

/// Account-wide client defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ClientConfig {
    /// Primary service endpoint
    #[cfg_attr(
        feature = "config",
        arg(long = "primary-endpoint", env = "STRATUS_PRIMARY_ENDPOINT")
    )]
    pub primary_endpoint: String,

    /// Secondary (read-only) service endpoint
    #[cfg_attr(
        feature = "config",
        arg(long = "secondary-endpoint", env = "STRATUS_SECONDARY_ENDPOINT")
    )]
    pub secondary_endpoint: Option<String>,

    /// Storage account name
    #[cfg_attr(
        feature = "config",
        arg(long = "account-name", env = "STRATUS_ACCOUNT_NAME")
    )]
    pub account_name: Option<String>,

    /// Base64 account key for shared-key signing
    #[cfg_attr(
        feature = "config",
        arg(long = "account-key", env = "STRATUS_ACCOUNT_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub account_key: Option<String>,

    /// Shared access signature used instead of an account key
    #[cfg_attr(
        feature = "config",
        arg(long = "sas-token", env = "STRATUS_SAS_TOKEN", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub sas_token: Option<String>,

    /// Shared-key scheme used to sign requests
    #[cfg_attr(
        feature = "config",
        arg(long = "authentication-scheme", env = "STRATUS_AUTHENTICATION_SCHEME")
    )]
    pub authentication_scheme: Option<AuthenticationScheme>,

    /// Default location mode
    #[cfg_attr(
        feature = "config",
        arg(long = "location-mode", env = "STRATUS_LOCATION_MODE")
    )]
    pub location_mode: Option<LocationMode>,

    /// Default per-attempt server timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "server-timeout", env = "STRATUS_SERVER_TIMEOUT_SECS")
    )]
    pub server_timeout_secs: Option<u64>,

    /// Default cross-retry execution time in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "maximum-execution-time",
            env = "STRATUS_MAXIMUM_EXECUTION_TIME_SECS"
        )
    )]
    pub maximum_execution_time_secs: Option<u64>,

    /// Default number of concurrent block uploads
    #[cfg_attr(
        feature = "config",
        arg(
            long = "parallel-operation-thread-count",
            env = "STRATUS_PARALLEL_OPERATION_THREAD_COUNT"
        )
    )]
    pub parallel_operation_thread_count: Option<u32>,

    /// Largest blob upload sent as a single request, in bytes
    #[cfg_attr(
        feature = "config",
        arg(
            long = "single-blob-upload-threshold",
            env = "STRATUS_SINGLE_BLOB_UPLOAD_THRESHOLD_BYTES"
        )
    )]
    pub single_blob_upload_threshold_bytes: Option<u64>,

    /// Default table payload format
    #[cfg_attr(
        feature = "config",
        arg(long = "payload-format", env = "STRATUS_PAYLOAD_FORMAT")
    )]
    pub payload_format: Option<PayloadFormat>,

    /// Treat the host as lacking content MD5 support
    #[cfg_attr(
        feature = "config",
        arg(long = "restricted-platform", env = "STRATUS_RESTRICTED_PLATFORM")
    )]
    #[serde(default)]
    pub restricted_platform: bool,
}

impl ClientConfig {
    /// Creates a configuration for `primary_endpoint` with every default.
    pub fn new(primary_endpoint: impl Into<String>) -> Self {
        Self {
            primary_endpoint: primary_endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the secondary endpoint.
    #[must_use]
    pub fn with_secondary_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.secondary_endpoint = Some(endpoint.into());
        self
    }

    /// Set shared-key credentials.
    #[must_use]
    pub fn with_shared_key(
        mut self,
        account_name: impl Into<String>,
        account_key: impl Into<String>,
    ) -> Self {
        self.account_name = Some(account_name.into());
        self.account_key = Some(account_key.into());
        self
    }

    /// Set the SAS token.
    #[must_use]
    pub fn with_sas_token(mut self, token: impl Into<String>) -> Self {
        self.sas_token = Some(token.into());
        self
    }

    /// Set the default server timeout in seconds.
    #[must_use]
    pub fn with_server_timeout_secs(mut self, secs: u64) -> Self {
        self.server_timeout_secs = Some(secs);
        self
    }

    /// Set the default maximum execution time in seconds.
    #[must_use]
    pub fn with_maximum_execution_time_secs(mut self, secs: u64) -> Self {
        self.maximum_execution_time_secs = Some(secs);
        self
    }

    /// Set the default location mode.
    #[must_use]
    pub fn with_location_mode(mut self, location_mode: LocationMode) -> Self {
        self.location_mode = Some(location_mode);
        self
    }

    /// Parses the endpoint pair.
    pub fn storage_uri(&self) -> Result<StorageUri> {
        stratus_core::bounds::assert_not_empty("primary_endpoint", &self.primary_endpoint)?;
        StorageUri::parse(&self.primary_endpoint, self.secondary_endpoint.as_deref())
    }

    /// Builds credentials: an account key wins over a SAS token, and
    /// neither means anonymous access.
    pub fn credentials(&self) -> Result<StorageCredentials> {
        match (&self.account_key, &self.sas_token) {
            (Some(key), _) => {
                let account_name = self
                    .account_name
                    .as_deref()
                    .ok_or_else(|| Error::missing_argument("account_name"))?;
                StorageCredentials::shared_key(account_name, key)
            }
            (None, Some(token)) => StorageCredentials::sas_token(token),
            (None, None) => Ok(StorageCredentials::Anonymous),
        }
    }

    /// Platform capabilities the clients are created with.
    pub fn capabilities(&self) -> PlatformCapabilities {
        if self.restricted_platform {
            PlatformCapabilities::restricted()
        } else {
            PlatformCapabilities::full()
        }
    }

    #[inline]
    pub fn server_timeout(&self) -> Option<Duration> {
        self.server_timeout_secs.map(Duration::from_secs)
    }

    #[inline]
    pub fn maximum_execution_time(&self) -> Option<Duration> {
        self.maximum_execution_time_secs.map(Duration::from_secs)
    }

    /// Applies the shared defaults through the validated setters.
    fn configure(&self, client: &mut ServiceClient) -> Result<()> {
        client.set_server_timeout(self.server_timeout())?;
        client.set_maximum_execution_time(self.maximum_execution_time())?;
        if let Some(location_mode) = self.location_mode {
            client.set_location_mode(location_mode);
        }
        if let Some(scheme) = self.authentication_scheme {
            client.set_authentication_scheme(scheme);
        }
        Ok(())
    }
}

impl BlobServiceClient {
    /// Creates a blob client from `config`.
    ///
    /// # Errors
    ///
    /// Fails on unparsable endpoints, bad credentials or out-of-range knobs.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut client = Self::new(
            config.storage_uri()?,
            config.credentials()?,
            config.capabilities(),
        );
        config.configure(&mut client)?;

        if let Some(count) = config.parallel_operation_thread_count {
            client.set_parallel_operation_thread_count(count)?;
        }
        if let Some(bytes) = config.single_blob_upload_threshold_bytes {
            client.set_single_blob_upload_threshold_in_bytes(bytes)?;
        }

        Ok(client)
    }
}

impl QueueServiceClient {
    /// Creates a queue client from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut client = Self::new(
            config.storage_uri()?,
            config.credentials()?,
            config.capabilities(),
        );
        config.configure(&mut client)?;
        Ok(client)
    }
}

impl TableServiceClient {
    /// Creates a table client from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut client = Self::new(
            config.storage_uri()?,
            config.credentials()?,
            config.capabilities(),
        );
        config.configure(&mut client)?;

        if let Some(payload_format) = config.payload_format {
            client.set_payload_format(payload_format);
        }

        Ok(client)
    }
}
