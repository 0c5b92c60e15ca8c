//! Inclusive range checks used by every configuration setter.
//!
//! Setters call into this module before storing anything, so a rejected
//! value never replaces the previous one and the error surfaces at the call
//! site that tried to set it.

use std::fmt;
use std::time::Duration;

use crate::limits::{
    MAX_PARALLEL_OPERATION_THREAD_COUNT, MAX_SINGLE_UPLOAD_BLOB_SIZE, MAX_TIMEOUT,
    MIN_PARALLEL_OPERATION_THREAD_COUNT, MIN_SINGLE_BLOB_UPLOAD_THRESHOLD, MIN_TIMEOUT,
};
use crate::{Error, Result, TRACING_TARGET_BOUNDS};

/// Fails with [`Error::OutOfRange`] unless `min <= value <= max`.
pub fn assert_in_bounds<T>(field: &'static str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + fmt::Debug,
{
    if value < min || value > max {
        tracing::warn!(
            target: TRACING_TARGET_BOUNDS,
            field,
            value = ?value,
            min = ?min,
            max = ?max,
            "Rejected out-of-range configuration value"
        );
        return Err(Error::out_of_range(field, &value, &min, &max));
    }

    Ok(())
}

/// Like [`assert_in_bounds`], but an absent value always passes.
pub fn assert_optional_in_bounds<T>(field: &'static str, value: Option<T>, min: T, max: T) -> Result<()>
where
    T: PartialOrd + fmt::Debug,
{
    match value {
        Some(value) => assert_in_bounds(field, value, min, max),
        None => Ok(()),
    }
}

/// Fails with [`Error::MissingArgument`] when `value` is empty.
pub fn assert_not_empty(argument: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::missing_argument(argument));
    }

    Ok(())
}

/// Validates a server timeout or maximum execution time.
pub fn check_timeout(field: &'static str, value: Option<Duration>) -> Result<()> {
    assert_optional_in_bounds(field, value, MIN_TIMEOUT, MAX_TIMEOUT)
}

/// Validates a parallel operation thread count.
pub fn check_parallel_operation_thread_count(value: u32) -> Result<()> {
    assert_in_bounds(
        "parallel_operation_thread_count",
        value,
        MIN_PARALLEL_OPERATION_THREAD_COUNT,
        MAX_PARALLEL_OPERATION_THREAD_COUNT,
    )
}

/// Validates a single blob upload threshold in bytes.
pub fn check_single_blob_upload_threshold(value: u64) -> Result<()> {
    assert_in_bounds(
        "single_blob_upload_threshold_in_bytes",
        value,
        MIN_SINGLE_BLOB_UPLOAD_THRESHOLD,
        MAX_SINGLE_UPLOAD_BLOB_SIZE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::MIB;

    #[test]
    fn test_in_bounds_accepts_inclusive_edges() {
        assert!(assert_in_bounds("n", 1, 1, 10).is_ok());
        assert!(assert_in_bounds("n", 10, 1, 10).is_ok());
        assert!(assert_in_bounds("n", 5, 1, 10).is_ok());
    }

    #[test]
    fn test_in_bounds_rejects_outside() {
        let err = assert_in_bounds("n", 11, 1, 10).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { field: "n", .. }));
        assert!(assert_in_bounds("n", 0, 1, 10).is_err());
    }

    #[test]
    fn test_optional_none_passes() {
        assert!(assert_optional_in_bounds::<u32>("n", None, 1, 10).is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        assert!(check_timeout("server_timeout", Some(Duration::ZERO)).is_ok());
        assert!(check_timeout("server_timeout", Some(MAX_TIMEOUT)).is_ok());
        assert!(check_timeout("server_timeout", None).is_ok());

        let too_long = MAX_TIMEOUT + Duration::from_millis(1);
        let err = check_timeout("maximum_execution_time", Some(too_long)).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfRange {
                field: "maximum_execution_time",
                ..
            }
        ));
    }

    #[test]
    fn test_parallelism_bounds() {
        assert!(check_parallel_operation_thread_count(0).is_err());
        assert!(check_parallel_operation_thread_count(1).is_ok());
        assert!(check_parallel_operation_thread_count(64).is_ok());
        assert!(check_parallel_operation_thread_count(65).is_err());
    }

    #[test]
    fn test_upload_threshold_bounds() {
        assert!(check_single_blob_upload_threshold(MIB - 1).is_err());
        assert!(check_single_blob_upload_threshold(MIB).is_ok());
        assert!(check_single_blob_upload_threshold(64 * MIB).is_ok());
        assert!(check_single_blob_upload_threshold(64 * MIB + 1).is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(assert_not_empty("table_name", "people").is_ok());
        assert!(matches!(
            assert_not_empty("table_name", ""),
            Err(Error::MissingArgument {
                argument: "table_name"
            })
        ));
    }
}
