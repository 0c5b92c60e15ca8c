//! Canonicalizers for the blob and queue services.

use super::{
    Canonicalizer, StringToSign, canonicalized_date, canonicalized_headers,
    canonicalized_resource, canonicalized_resource_lite,
};
use crate::request::SignableRequest;
use crate::scheme::{AuthenticationScheme, ServiceFamily};

/// Full shared-key layout for blob and queue requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobQueueSharedKey;

impl Canonicalizer for BlobQueueSharedKey {
    fn scheme(&self) -> AuthenticationScheme {
        AuthenticationScheme::SharedKey
    }

    fn family(&self) -> ServiceFamily {
        ServiceFamily::BlobQueue
    }

    fn canonicalize(&self, request: &SignableRequest, account_name: &str) -> String {
        // A zero-length body signs as an empty field.
        let content_length = match request.content_length() {
            Some(0) | None => String::new(),
            Some(len) => len.to_string(),
        };
        // `x-ms-date` is signed with the other headers and blanks the date line.
        let date = match request.header("x-ms-date") {
            Some(_) => "",
            None => request.header_or_empty("date"),
        };

        StringToSign::new()
            .line(request.method())
            .line(request.header_or_empty("content-encoding"))
            .line(request.header_or_empty("content-language"))
            .line(&content_length)
            .line(request.header_or_empty("content-md5"))
            .line(request.header_or_empty("content-type"))
            .line(date)
            .line(request.header_or_empty("if-modified-since"))
            .line(request.header_or_empty("if-match"))
            .line(request.header_or_empty("if-none-match"))
            .line(request.header_or_empty("if-unmodified-since"))
            .line(request.header_or_empty("range"))
            .raw(&canonicalized_headers(request))
            .raw(&canonicalized_resource(request, account_name))
            .finish()
    }
}

/// Shared-key lite layout for blob and queue requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobQueueSharedKeyLite;

impl Canonicalizer for BlobQueueSharedKeyLite {
    fn scheme(&self) -> AuthenticationScheme {
        AuthenticationScheme::SharedKeyLite
    }

    fn family(&self) -> ServiceFamily {
        ServiceFamily::BlobQueue
    }

    fn canonicalize(&self, request: &SignableRequest, account_name: &str) -> String {
        StringToSign::new()
            .line(request.method())
            .line(request.header_or_empty("content-md5"))
            .line(request.header_or_empty("content-type"))
            .line(canonicalized_date(request, false))
            .raw(&canonicalized_headers(request))
            .raw(&canonicalized_resource_lite(request, account_name))
            .finish()
    }
}
