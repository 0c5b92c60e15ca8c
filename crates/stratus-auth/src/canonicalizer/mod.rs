//! Canonical string-to-sign builders and their selection.
//!
//! Four canonicalizers exist, one per `(scheme, family)` pair. They carry no
//! state, live in `static`s, and are shared by every request in the process.

mod blob_queue;
mod table;

use std::collections::BTreeMap;
use std::fmt;

pub use self::blob_queue::{BlobQueueSharedKey, BlobQueueSharedKeyLite};
pub use self::table::{TableSharedKey, TableSharedKeyLite};
use crate::request::SignableRequest;
use crate::scheme::{AuthenticationScheme, ServiceFamily};

/// Suffix a path-style secondary endpoint appends to the account segment.
pub const SECONDARY_LOCATION_ACCOUNT_SUFFIX: &str = "-secondary";

static BLOB_QUEUE_SHARED_KEY: BlobQueueSharedKey = BlobQueueSharedKey;
static BLOB_QUEUE_SHARED_KEY_LITE: BlobQueueSharedKeyLite = BlobQueueSharedKeyLite;
static TABLE_SHARED_KEY: TableSharedKey = TableSharedKey;
static TABLE_SHARED_KEY_LITE: TableSharedKeyLite = TableSharedKeyLite;

/// Builds the exact string that is signed to authenticate a request.
pub trait Canonicalizer: fmt::Debug + Send + Sync {
    /// Scheme this canonicalizer implements.
    fn scheme(&self) -> AuthenticationScheme;

    /// Service family whose layout this canonicalizer follows.
    fn family(&self) -> ServiceFamily;

    /// Builds the string to sign for `request` on behalf of `account_name`.
    fn canonicalize(&self, request: &SignableRequest, account_name: &str) -> String;

    /// Scheme name written into the `Authorization` header.
    fn authorization_scheme(&self) -> &'static str {
        self.scheme().authorization_scheme()
    }
}

/// Returns the canonicalizer for a scheme and service family.
///
/// Selection is a pure lookup over closed enums: every pair has exactly one
/// canonicalizer and repeated calls return the same instance.
pub fn select(scheme: AuthenticationScheme, family: ServiceFamily) -> &'static dyn Canonicalizer {
    match (family, scheme) {
        (ServiceFamily::BlobQueue, AuthenticationScheme::SharedKey) => &BLOB_QUEUE_SHARED_KEY,
        (ServiceFamily::BlobQueue, AuthenticationScheme::SharedKeyLite) => {
            &BLOB_QUEUE_SHARED_KEY_LITE
        }
        (ServiceFamily::Table, AuthenticationScheme::SharedKey) => &TABLE_SHARED_KEY,
        (ServiceFamily::Table, AuthenticationScheme::SharedKeyLite) => &TABLE_SHARED_KEY_LITE,
    }
}

/// Accumulates newline-terminated fields of a string to sign.
#[derive(Debug, Default)]
pub(crate) struct StringToSign {
    buf: String,
}

impl StringToSign {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends `value` followed by a newline.
    pub(crate) fn line(&mut self, value: &str) -> &mut Self {
        self.buf.push_str(value);
        self.buf.push('\n');
        self
    }

    /// Appends `value` verbatim.
    pub(crate) fn raw(&mut self, value: &str) -> &mut Self {
        self.buf.push_str(value);
        self
    }

    pub(crate) fn finish(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}

/// Every `x-ms-*` header as `name:value\n`, sorted by name.
pub(crate) fn canonicalized_headers(request: &SignableRequest) -> String {
    request
        .headers()
        .filter(|(name, _)| name.starts_with("x-ms-"))
        .map(|(name, value)| format!("{name}:{}\n", value.trim()))
        .collect()
}

/// The date line: `x-ms-date` when `allow_ms_date` and present, else `Date`.
pub(crate) fn canonicalized_date(request: &SignableRequest, allow_ms_date: bool) -> &str {
    if allow_ms_date && let Some(date) = request.header("x-ms-date") {
        return date;
    }

    request.header_or_empty("date")
}

/// `/account/path`, with a path-style secondary account segment normalized.
fn resource_path(request: &SignableRequest, account_name: &str) -> String {
    let path = request.url().path();
    let secondary = format!("/{account_name}{SECONDARY_LOCATION_ACCOUNT_SUFFIX}");

    let path = match path.strip_prefix(&secondary) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            format!("/{account_name}{rest}")
        }
        _ => path.to_string(),
    };

    format!("/{account_name}{path}")
}

/// Resource plus every query parameter as `\nname:v1,v2`.
pub(crate) fn canonicalized_resource(request: &SignableRequest, account_name: &str) -> String {
    let mut resource = resource_path(request, account_name);

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in request.url().query_pairs() {
        params
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into_owned());
    }

    for (name, mut values) in params {
        values.sort();
        resource.push('\n');
        resource.push_str(&name);
        resource.push(':');
        resource.push_str(&values.join(","));
    }

    resource
}

/// Resource plus only the `comp` parameter as `?comp=value`.
pub(crate) fn canonicalized_resource_lite(request: &SignableRequest, account_name: &str) -> String {
    let mut resource = resource_path(request, account_name);

    if let Some((_, comp)) = request
        .url()
        .query_pairs()
        .find(|(name, _)| name.eq_ignore_ascii_case("comp"))
    {
        resource.push_str("?comp=");
        resource.push_str(&comp);
    }

    resource
}
