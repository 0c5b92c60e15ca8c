use derive_more::{Deref, DerefMut};
use stratus_auth::{StorageCredentials, StorageService};

use super::ServiceClient;
use crate::command::{PreparedOperation, RequestCommand};
use crate::endpoint::StorageUri;
use crate::naming;
use crate::options::{EffectiveTableOptions, PayloadFormat, TableRequestOptions};
use crate::platform::PlatformCapabilities;
use crate::{Result, TRACING_TARGET_CLIENT};

/// Client for the table service.
#[derive(Debug, Clone, Deref, DerefMut)]
pub struct TableServiceClient {
    #[deref]
    #[deref_mut]
    client: ServiceClient,
    payload_format: PayloadFormat,
}

impl TableServiceClient {
    /// Creates a table client with the default payload format.
    pub fn new(
        storage_uri: StorageUri,
        credentials: StorageCredentials,
        capabilities: PlatformCapabilities,
    ) -> Self {
        Self {
            client: ServiceClient::new(
                StorageService::Table,
                storage_uri,
                credentials,
                capabilities,
            ),
            payload_format: PayloadFormat::default(),
        }
    }

    /// Default payload format.
    #[inline]
    pub fn payload_format(&self) -> PayloadFormat {
        self.payload_format
    }

    /// Sets the default payload format.
    pub fn set_payload_format(&mut self, payload_format: PayloadFormat) {
        self.payload_format = payload_format;
    }

    /// Prepares an operation on the table named `table_name`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingArgument`] for an empty name and
    /// [`crate::Error::InvalidArgument`] for a malformed one or a location
    /// mode the endpoints cannot serve.
    pub fn prepare_table_operation(
        &self,
        table_name: &str,
        options: Option<&TableRequestOptions>,
    ) -> Result<PreparedOperation<EffectiveTableOptions>> {
        naming::validate_table_name(table_name)?;

        let effective = TableRequestOptions::resolve(options, self)?;
        self.storage_uri()
            .validate_location_mode(effective.location_mode)?;

        let mut command = RequestCommand::new(self.storage_uri().append_path(table_name)?);
        effective.apply_to_command(&mut command)?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            table_name,
            payload_format = %effective.payload_format,
            "Prepared table operation"
        );

        Ok(PreparedOperation::new(
            effective,
            command,
            self.canonicalizer(),
        ))
    }
}
