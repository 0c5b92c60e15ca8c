//! Resource name rules checked before any request is built.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Container addressed when a listing path has no container segment.
pub const ROOT_CONTAINER_NAME: &str = "$root";

/// Container holding storage analytics logs.
pub const LOGS_CONTAINER_NAME: &str = "$logs";

/// Longest blob name accepted by the service.
pub const MAX_BLOB_NAME_LENGTH: usize = 1024;

static CONTAINER_OR_QUEUE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,61}[a-z0-9]$").expect("valid regex"));

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]{2,62}$").expect("valid regex"));

/// Validates a container name; `$root` and `$logs` are accepted.
pub fn validate_container_name(name: &str) -> Result<()> {
    if name == ROOT_CONTAINER_NAME || name == LOGS_CONTAINER_NAME {
        return Ok(());
    }

    validate_dns_name("container_name", name)
}

/// Validates a queue name.
pub fn validate_queue_name(name: &str) -> Result<()> {
    validate_dns_name("queue_name", name)
}

/// Validates a table name.
pub fn validate_table_name(name: &str) -> Result<()> {
    stratus_core::bounds::assert_not_empty("table_name", name)?;

    if !TABLE_NAME.is_match(name) {
        return Err(Error::invalid_argument(
            "table_name",
            format!("'{name}' must be 3-63 alphanumeric characters starting with a letter"),
        ));
    }

    Ok(())
}

/// Validates a blob name.
pub fn validate_blob_name(name: &str) -> Result<()> {
    stratus_core::bounds::assert_not_empty("blob_name", name)?;

    let length = name.chars().count();
    if length > MAX_BLOB_NAME_LENGTH {
        return Err(Error::invalid_argument(
            "blob_name",
            format!("{length} characters exceeds the {MAX_BLOB_NAME_LENGTH} character limit"),
        ));
    }

    // URL path normalization would resolve these and address another blob.
    if name.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(Error::invalid_argument(
            "blob_name",
            format!("'{name}' contains a '.' or '..' path segment"),
        ));
    }

    Ok(())
}

fn validate_dns_name(argument: &'static str, name: &str) -> Result<()> {
    stratus_core::bounds::assert_not_empty(argument, name)?;

    if !CONTAINER_OR_QUEUE_NAME.is_match(name) || name.contains("--") {
        return Err(Error::invalid_argument(
            argument,
            format!(
                "'{name}' must be 3-63 lowercase letters, digits or single hyphens, \
                 starting and ending with a letter or digit"
            ),
        ));
    }

    Ok(())
}
