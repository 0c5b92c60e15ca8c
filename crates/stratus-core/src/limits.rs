//! Legal ranges and defaults for the numeric configuration surface.

use std::time::Duration;

/// One mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Largest server timeout or maximum execution time accepted by any setter.
///
/// Timeouts travel as milliseconds in a signed 32-bit field on some wire
/// paths; 24 days is the largest whole-day value that still fits.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 24 * 60 * 60);

/// Smallest timeout accepted by any setter.
pub const MIN_TIMEOUT: Duration = Duration::ZERO;

/// Lower bound for the parallel operation thread count.
pub const MIN_PARALLEL_OPERATION_THREAD_COUNT: u32 = 1;

/// Upper bound for the parallel operation thread count.
pub const MAX_PARALLEL_OPERATION_THREAD_COUNT: u32 = 64;

/// Default parallel operation thread count for blob uploads.
pub const DEFAULT_PARALLEL_OPERATION_THREAD_COUNT: u32 = 1;

/// Smallest single-shot blob upload threshold.
pub const MIN_SINGLE_BLOB_UPLOAD_THRESHOLD: u64 = MIB;

/// Largest blob that may be uploaded in a single request.
pub const MAX_SINGLE_UPLOAD_BLOB_SIZE: u64 = 64 * MIB;

/// Default single-shot blob upload threshold.
pub const DEFAULT_SINGLE_BLOB_UPLOAD_THRESHOLD: u64 = MAX_SINGLE_UPLOAD_BLOB_SIZE / 2;

/// Page blob writes are aligned to this many bytes.
pub const PAGE_SIZE: u64 = 512;
