//! Authentication schemes and the services they sign for.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Shared-key flavour used to sign requests.
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
pub enum AuthenticationScheme {
    /// Full shared key: most headers and every query parameter are signed.
    #[default]
    SharedKey,
    /// Shared key lite: a reduced header set and only the `comp` parameter.
    SharedKeyLite,
}

impl AuthenticationScheme {
    /// Returns the scheme name carried in the `Authorization` header.
    pub fn authorization_scheme(self) -> &'static str {
        match self {
            Self::SharedKey => "SharedKey",
            Self::SharedKeyLite => "SharedKeyLite",
        }
    }
}

/// Group of services sharing one canonical string layout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr
)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceFamily {
    /// Blob and queue services.
    BlobQueue,
    /// Table service.
    Table,
}

/// A storage service behind the account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr
)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StorageService {
    /// Blob service.
    Blob,
    /// Queue service.
    Queue,
    /// Table service.
    Table,
}

impl StorageService {
    /// Returns the canonical string family this service signs with.
    #[inline]
    pub fn family(self) -> ServiceFamily {
        match self {
            Self::Blob | Self::Queue => ServiceFamily::BlobQueue,
            Self::Table => ServiceFamily::Table,
        }
    }
}
