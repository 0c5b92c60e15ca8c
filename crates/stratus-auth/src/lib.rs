#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for request signing.
pub const TRACING_TARGET_SIGNING: &str = "stratus_auth::signing";

pub mod canonicalizer;
mod credentials;
mod request;
mod scheme;

pub use stratus_core::{Error, Result};

pub use crate::canonicalizer::Canonicalizer;
pub use crate::credentials::StorageCredentials;
pub use crate::request::{SignableRequest, SignableRequestBuilder, SignableRequestBuilderError};
pub use crate::scheme::{AuthenticationScheme, ServiceFamily, StorageService};
