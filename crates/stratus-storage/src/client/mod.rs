//! Service clients and their account-wide defaults.
//!
//! [`ServiceClient`] holds everything the three services share; the blob,
//! queue and table clients wrap it and add their own knobs. Clients are
//! `Send + Sync` and are read concurrently by any number of operations.
//! Changing a default takes `&mut self`, so mutation is serialized by
//! ownership (or by a lock the caller owns) and never observed half-way by
//! an in-flight resolution.

mod blob;
mod config;
mod queue;
mod table;

use std::sync::Arc;
use std::time::Duration;

use stratus_auth::{
    AuthenticationScheme, Canonicalizer, SignableRequest, StorageCredentials, StorageService,
    canonicalizer,
};

pub use self::blob::{BlobServiceClient, DEFAULT_DELIMITER, UploadPlan, UploadStrategy};
pub use self::config::ClientConfig;
pub use self::queue::QueueServiceClient;
pub use self::table::TableServiceClient;
use crate::endpoint::{StorageUri, account_name_from_endpoint, uses_path_style};
use crate::location::LocationMode;
use crate::platform::PlatformCapabilities;
use crate::retry::{NoRetry, RetryPolicy};
use crate::{Result, TRACING_TARGET_CLIENT};

/// Defaults shared by every service client.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    service: StorageService,
    storage_uri: StorageUri,
    credentials: StorageCredentials,
    account_name: Option<String>,
    uses_path_style_uris: bool,
    capabilities: PlatformCapabilities,
    retry_policy: Arc<dyn RetryPolicy>,
    location_mode: LocationMode,
    server_timeout: Option<Duration>,
    maximum_execution_time: Option<Duration>,
    authentication_scheme: AuthenticationScheme,
}

impl ServiceClient {
    /// Creates a client for `service` at `storage_uri`.
    ///
    /// Addressing style comes from the primary endpoint's shape. The account
    /// name comes from the credentials, or from the endpoint when the
    /// credentials carry none.
    pub fn new(
        service: StorageService,
        storage_uri: StorageUri,
        credentials: StorageCredentials,
        capabilities: PlatformCapabilities,
    ) -> Self {
        let uses_path_style_uris = uses_path_style(storage_uri.primary());
        let account_name = credentials
            .account_name()
            .map(str::to_string)
            .or_else(|| account_name_from_endpoint(storage_uri.primary(), uses_path_style_uris));

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            %service,
            primary = %storage_uri.primary(),
            has_secondary = storage_uri.secondary().is_some(),
            path_style = uses_path_style_uris,
            account_name = account_name.as_deref(),
            account_key = credentials.account_key_masked().as_deref(),
            "Created service client"
        );

        Self {
            service,
            storage_uri,
            credentials,
            account_name,
            uses_path_style_uris,
            capabilities,
            retry_policy: Arc::new(NoRetry),
            location_mode: LocationMode::default(),
            server_timeout: None,
            maximum_execution_time: None,
            authentication_scheme: AuthenticationScheme::default(),
        }
    }

    /// Service this client talks to.
    #[inline]
    pub fn service(&self) -> StorageService {
        self.service
    }

    /// Endpoint pair of the account.
    #[inline]
    pub fn storage_uri(&self) -> &StorageUri {
        &self.storage_uri
    }

    /// Credentials requests are authorized with.
    #[inline]
    pub fn credentials(&self) -> &StorageCredentials {
        &self.credentials
    }

    /// Account name from the credentials or the endpoint.
    #[inline]
    pub fn account_name(&self) -> Option<&str> {
        self.account_name.as_deref()
    }

    /// Returns whether the account is addressed in the path.
    #[inline]
    pub fn uses_path_style_uris(&self) -> bool {
        self.uses_path_style_uris
    }

    /// Platform capabilities the resolver consults.
    #[inline]
    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    /// Default retry policy.
    #[inline]
    pub fn retry_policy(&self) -> &Arc<dyn RetryPolicy> {
        &self.retry_policy
    }

    /// Sets the default retry policy.
    pub fn set_retry_policy(&mut self, retry_policy: Arc<dyn RetryPolicy>) {
        self.retry_policy = retry_policy;
    }

    /// Default location mode.
    #[inline]
    pub fn location_mode(&self) -> LocationMode {
        self.location_mode
    }

    /// Sets the default location mode.
    pub fn set_location_mode(&mut self, location_mode: LocationMode) {
        self.location_mode = location_mode;
    }

    /// Default per-attempt server timeout.
    #[inline]
    pub fn server_timeout(&self) -> Option<Duration> {
        self.server_timeout
    }

    /// Sets the default per-attempt server timeout.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] outside `[0, 24 days]`.
    pub fn set_server_timeout(&mut self, server_timeout: Option<Duration>) -> Result<()> {
        stratus_core::bounds::check_timeout("server_timeout", server_timeout)?;
        self.server_timeout = server_timeout;
        Ok(())
    }

    /// Default cross-retry execution time.
    #[inline]
    pub fn maximum_execution_time(&self) -> Option<Duration> {
        self.maximum_execution_time
    }

    /// Sets the default cross-retry execution time.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfRange`] outside `[0, 24 days]`.
    pub fn set_maximum_execution_time(
        &mut self,
        maximum_execution_time: Option<Duration>,
    ) -> Result<()> {
        stratus_core::bounds::check_timeout("maximum_execution_time", maximum_execution_time)?;
        self.maximum_execution_time = maximum_execution_time;
        Ok(())
    }

    /// Scheme used by operations prepared from now on.
    #[inline]
    pub fn authentication_scheme(&self) -> AuthenticationScheme {
        self.authentication_scheme
    }

    /// Sets the scheme; operations already prepared keep theirs.
    pub fn set_authentication_scheme(&mut self, scheme: AuthenticationScheme) {
        self.authentication_scheme = scheme;
    }

    /// Canonicalizer for the current scheme and this client's service family.
    pub fn canonicalizer(&self) -> &'static dyn Canonicalizer {
        canonicalizer::select(self.authentication_scheme, self.service.family())
    }

    /// Signs `request` with this client's credentials and current scheme.
    ///
    /// Attempts of a prepared operation go through
    /// [`crate::PreparedOperation::authorize`] instead.
    pub fn authorize(&self, request: &mut SignableRequest) {
        self.credentials.authorize(request, self.canonicalizer());
    }
}
