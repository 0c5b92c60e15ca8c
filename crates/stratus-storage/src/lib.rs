#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for client construction and operation preparation.
pub const TRACING_TARGET_CLIENT: &str = "stratus_storage::client";

/// Tracing target for request options resolution.
pub const TRACING_TARGET_OPTIONS: &str = "stratus_storage::options";

/// Tracing target for command policy application and deadline checks.
pub const TRACING_TARGET_COMMAND: &str = "stratus_storage::command";

pub mod client;
pub mod command;
pub mod endpoint;
pub mod listing;
pub mod location;
pub mod naming;
pub mod options;
pub mod platform;
pub mod retry;

pub use stratus_core::{Error, Result};

pub use crate::client::{
    BlobServiceClient, ClientConfig, QueueServiceClient, ServiceClient, TableServiceClient,
};
pub use crate::command::{PreparedOperation, RequestCommand};
pub use crate::endpoint::{StorageLocation, StorageUri};
pub use crate::listing::parse_user_prefix;
pub use crate::location::LocationMode;
pub use crate::platform::PlatformCapabilities;
pub use crate::retry::{NoRetry, RetryAttempt, RetryPolicy};
