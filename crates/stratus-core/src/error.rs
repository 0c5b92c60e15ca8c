//! Error types for configuration and policy resolution.

use std::fmt;

use strum::IntoStaticStr;

/// Result type for all stratus configuration operations.
///
/// This is a convenience type alias that defaults to using [`Error`] as the error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while configuring clients, options and commands.
///
/// Every variant describes a caller misconfiguration. They surface
/// synchronously from the call that triggered them and are never retried.
#[derive(Debug, thiserror::Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// A configuration value fell outside its inclusive legal range.
    #[error("'{field}' must be within [{min}, {max}], got {value}")]
    OutOfRange {
        /// Name of the rejected field.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// Inclusive lower bound.
        min: String,
        /// Inclusive upper bound.
        max: String,
    },

    /// The caller tried to enable a feature the current platform forbids.
    #[error("'{feature}' is not supported on this platform")]
    UnsupportedOnPlatform {
        /// Name of the rejected feature.
        feature: &'static str,
    },

    /// A required identifier was missing or empty.
    #[error("required argument '{argument}' is missing or empty")]
    MissingArgument {
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// An argument was present but malformed.
    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument {
        /// Name of the rejected argument.
        argument: &'static str,
        /// Why the argument was rejected.
        reason: String,
    },

    /// An endpoint could not be parsed as a URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// Deadline arithmetic left the representable time range.
    #[error("deadline computation overflowed: {0}")]
    DeadlineOverflow(#[from] jiff::Error),
}

impl Error {
    /// Create an out-of-range error from the rejected value and its bounds.
    pub fn out_of_range<T: fmt::Debug>(field: &'static str, value: &T, min: &T, max: &T) -> Self {
        Self::OutOfRange {
            field,
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create an unsupported-on-platform error.
    pub fn unsupported_on_platform(feature: &'static str) -> Self {
        Self::UnsupportedOnPlatform { feature }
    }

    /// Create a missing argument error.
    pub fn missing_argument(argument: &'static str) -> Self {
        Self::MissingArgument { argument }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    /// Returns whether this error should trigger an automatic retry.
    ///
    /// Configuration errors never do; transient failures belong to the
    /// transport layer and do not flow through this type.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::OutOfRange { .. }
            | Error::UnsupportedOnPlatform { .. }
            | Error::MissingArgument { .. }
            | Error::InvalidArgument { .. }
            | Error::InvalidEndpoint(_)
            | Error::DeadlineOverflow(_) => false,
        }
    }

    /// Returns the error kind as a stable snake_case string for logging.
    pub fn kind_str(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_out_of_range_message_names_field_and_bounds() {
        let err = Error::out_of_range(
            "server_timeout",
            &Duration::from_secs(5),
            &Duration::ZERO,
            &Duration::from_secs(1),
        );

        let message = err.to_string();
        assert!(message.contains("server_timeout"));
        assert!(message.contains("5s"));
        assert!(message.contains("1s"));
    }

    #[test]
    fn test_kind_str() {
        assert_eq!(Error::missing_argument("table_name").kind_str(), "missing_argument");
        assert_eq!(
            Error::unsupported_on_platform("use_transactional_md5").kind_str(),
            "unsupported_on_platform"
        );
    }

    #[test]
    fn test_nothing_is_retryable() {
        let errors = [
            Error::missing_argument("container_name"),
            Error::unsupported_on_platform("store_blob_content_md5"),
            Error::invalid_argument("account_key", "not base64"),
            Error::out_of_range("parallel_operation_thread_count", &0u32, &1, &64),
        ];

        assert!(errors.iter().all(|err| !err.is_retryable()));
    }
}
