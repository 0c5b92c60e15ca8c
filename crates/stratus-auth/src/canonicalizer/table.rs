//! Canonicalizers for the table service.
//!
//! Table requests never sign `x-ms-*` headers individually; the date line
//! takes `x-ms-date` when present instead.

use super::{Canonicalizer, StringToSign, canonicalized_date, canonicalized_resource_lite};
use crate::request::SignableRequest;
use crate::scheme::{AuthenticationScheme, ServiceFamily};

/// Full shared-key layout for table requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableSharedKey;

impl Canonicalizer for TableSharedKey {
    fn scheme(&self) -> AuthenticationScheme {
        AuthenticationScheme::SharedKey
    }

    fn family(&self) -> ServiceFamily {
        ServiceFamily::Table
    }

    fn canonicalize(&self, request: &SignableRequest, account_name: &str) -> String {
        StringToSign::new()
            .line(request.method())
            .line(request.header_or_empty("content-md5"))
            .line(request.header_or_empty("content-type"))
            .line(canonicalized_date(request, true))
            .raw(&canonicalized_resource_lite(request, account_name))
            .finish()
    }
}

/// Shared-key lite layout for table requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableSharedKeyLite;

impl Canonicalizer for TableSharedKeyLite {
    fn scheme(&self) -> AuthenticationScheme {
        AuthenticationScheme::SharedKeyLite
    }

    fn family(&self) -> ServiceFamily {
        ServiceFamily::Table
    }

    fn canonicalize(&self, request: &SignableRequest, account_name: &str) -> String {
        StringToSign::new()
            .line(canonicalized_date(request, true))
            .raw(&canonicalized_resource_lite(request, account_name))
            .finish()
    }
}
