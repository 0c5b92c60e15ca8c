#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for rejected configuration values.
pub const TRACING_TARGET_BOUNDS: &str = "stratus_core::bounds";

pub mod bounds;
mod error;
pub mod limits;

pub use crate::error::{Error, Result};
