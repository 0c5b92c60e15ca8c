use derive_more::{Deref, DerefMut};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{RequestOptions, ResolvedOptions};
use crate::client::TableServiceClient;
use crate::{Result, TRACING_TARGET_OPTIONS};

/// OData metadata level of table payloads.
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
pub enum PayloadFormat {
    /// JSON with minimal metadata.
    #[default]
    Json,
    /// JSON with full metadata.
    JsonFullMetadata,
    /// JSON without metadata.
    JsonNoMetadata,
}

impl PayloadFormat {
    /// Value of the `Accept` header requesting this format.
    pub fn accept_header(self) -> &'static str {
        match self {
            Self::Json => "application/json;odata=minimalmetadata",
            Self::JsonFullMetadata => "application/json;odata=fullmetadata",
            Self::JsonNoMetadata => "application/json;odata=nometadata",
        }
    }
}

/// Per-call overrides for table operations.
#[derive(Debug, Clone, Default, Deref, DerefMut)]
pub struct TableRequestOptions {
    #[deref]
    #[deref_mut]
    common: RequestOptions,
    payload_format: Option<PayloadFormat>,
    project_system_properties: Option<bool>,
}

impl TableRequestOptions {
    /// Returns the payload format override.
    #[inline]
    pub fn payload_format(&self) -> Option<PayloadFormat> {
        self.payload_format
    }

    /// Overrides the payload format.
    pub fn set_payload_format(&mut self, payload_format: Option<PayloadFormat>) {
        self.payload_format = payload_format;
    }

    /// Returns whether system properties are projected, if overridden.
    #[inline]
    pub fn project_system_properties(&self) -> Option<bool> {
        self.project_system_properties
    }

    pub fn set_project_system_properties(&mut self, value: Option<bool>) {
        self.project_system_properties = value;
    }

    /// Resolves `options` against `client`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::DeadlineOverflow`] when the deadline is
    /// unrepresentable.
    pub fn resolve(
        options: Option<&Self>,
        client: &TableServiceClient,
    ) -> Result<EffectiveTableOptions> {
        let modified = options.cloned().unwrap_or_default();
        let common = modified.common.into_resolved(client, Timestamp::now())?;

        let effective = EffectiveTableOptions {
            common,
            payload_format: modified
                .payload_format
                .unwrap_or(client.payload_format()),
            project_system_properties: modified.project_system_properties.unwrap_or(true),
        };

        tracing::debug!(
            target: TRACING_TARGET_OPTIONS,
            service = "table",
            location_mode = %effective.location_mode,
            server_timeout = ?effective.server_timeout,
            operation_expiry_time = ?effective.operation_expiry_time,
            payload_format = %effective.payload_format,
            "Resolved request options"
        );

        Ok(effective)
    }
}

/// Fully populated options for one table operation.
#[derive(Debug, Clone, Serialize, Deref)]
pub struct EffectiveTableOptions {
    /// Options shared by every service.
    #[deref]
    #[serde(flatten)]
    pub common: ResolvedOptions,
    /// OData metadata level.
    pub payload_format: PayloadFormat,
    /// Return system properties with entities.
    pub project_system_properties: bool,
}
