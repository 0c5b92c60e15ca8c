use derive_more::{Deref, DerefMut};
use stratus_auth::{StorageCredentials, StorageService};

use super::ServiceClient;
use crate::command::{PreparedOperation, RequestCommand};
use crate::endpoint::StorageUri;
use crate::naming;
use crate::options::{EffectiveQueueOptions, QueueRequestOptions};
use crate::platform::PlatformCapabilities;
use crate::{Result, TRACING_TARGET_CLIENT};

/// Client for the queue service.
#[derive(Debug, Clone, Deref, DerefMut)]
pub struct QueueServiceClient {
    client: ServiceClient,
}

impl QueueServiceClient {
    /// Creates a queue client.
    pub fn new(
        storage_uri: StorageUri,
        credentials: StorageCredentials,
        capabilities: PlatformCapabilities,
    ) -> Self {
        Self {
            client: ServiceClient::new(
                StorageService::Queue,
                storage_uri,
                credentials,
                capabilities,
            ),
        }
    }

    /// Prepares an operation on the queue named `queue_name`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingArgument`] for an empty name and
    /// [`crate::Error::InvalidArgument`] for a malformed one or a location
    /// mode the endpoints cannot serve.
    pub fn prepare_queue_operation(
        &self,
        queue_name: &str,
        options: Option<&QueueRequestOptions>,
    ) -> Result<PreparedOperation<EffectiveQueueOptions>> {
        naming::validate_queue_name(queue_name)?;

        let effective = QueueRequestOptions::resolve(options, self)?;
        self.storage_uri()
            .validate_location_mode(effective.location_mode)?;

        let mut command = RequestCommand::new(self.storage_uri().append_path(queue_name)?);
        effective.apply_to_command(&mut command)?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            queue_name,
            "Prepared queue operation"
        );

        Ok(PreparedOperation::new(
            effective,
            command,
            self.canonicalizer(),
        ))
    }
}
