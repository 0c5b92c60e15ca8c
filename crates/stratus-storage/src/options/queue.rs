use derive_more::{Deref, DerefMut};
use jiff::Timestamp;
use serde::Serialize;

use super::{RequestOptions, ResolvedOptions};
use crate::client::QueueServiceClient;
use crate::{Result, TRACING_TARGET_OPTIONS};

/// Per-call overrides for queue operations.
#[derive(Debug, Clone, Default, Deref, DerefMut)]
pub struct QueueRequestOptions {
    common: RequestOptions,
}

impl QueueRequestOptions {
    /// Resolves `options` against `client`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DeadlineOverflow`] when the deadline is
    /// unrepresentable.
    pub fn resolve(
        options: Option<&Self>,
        client: &QueueServiceClient,
    ) -> Result<EffectiveQueueOptions> {
        let modified = options.cloned().unwrap_or_default();
        let common = modified.common.into_resolved(client, Timestamp::now())?;

        tracing::debug!(
            target: TRACING_TARGET_OPTIONS,
            service = "queue",
            location_mode = %common.location_mode,
            server_timeout = ?common.server_timeout,
            operation_expiry_time = ?common.operation_expiry_time,
            "Resolved request options"
        );

        Ok(EffectiveQueueOptions { common })
    }
}

/// Fully populated options for one queue operation.
#[derive(Debug, Clone, Serialize, Deref)]
pub struct EffectiveQueueOptions {
    /// Options shared by every service.
    #[serde(flatten)]
    pub common: ResolvedOptions,
}
