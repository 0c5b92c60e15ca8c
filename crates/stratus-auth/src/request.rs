//! Transport-neutral view of an outgoing request for signing.

use std::collections::BTreeMap;

use derive_builder::Builder;
use url::Url;

/// The parts of an HTTP request that participate in shared-key signing.
///
/// Header names are stored lowercased so lookups are case-insensitive and
/// iteration is already in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate_request")
)]
pub struct SignableRequest {
    /// HTTP verb, e.g. `GET`.
    method: String,
    /// Fully-qualified request URL including query.
    url: Url,
    /// Request headers keyed by lowercased name.
    #[builder(setter(custom), default)]
    headers: BTreeMap<String, String>,
    /// Body length, if the request carries one.
    #[builder(setter(into, strip_option), default)]
    content_length: Option<u64>,
}

impl SignableRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into(),
            url,
            headers: BTreeMap::new(),
            content_length: None,
        }
    }

    /// Creates a new request builder.
    pub fn builder() -> SignableRequestBuilder {
        SignableRequestBuilder::default()
    }

    /// Returns the HTTP verb.
    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the request URL.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns a mutable reference to the request URL.
    #[inline]
    pub fn url_mut(&mut self) -> &mut Url {
        &mut self.url
    }

    /// Returns the body length, if any.
    #[inline]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns a header value or the empty string.
    pub(crate) fn header_or_empty(&self, name: &str) -> &str {
        self.header(name).unwrap_or_default()
    }

    /// Iterates headers in lowercased-name order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets or replaces a header.
    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }
}

impl SignableRequestBuilder {
    /// Adds a header; names are lowercased.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    fn validate_request(&self) -> Result<(), String> {
        if let Some(method) = &self.method {
            if method.is_empty() {
                return Err("Method cannot be empty".to_string());
            }

            if !method.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(format!("Method '{method}' must be an uppercase HTTP verb"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://account.blob.core.windows.net/container/blob").unwrap()
    }

    #[test]
    fn test_builder() {
        let request = SignableRequest::builder()
            .with_method("PUT")
            .with_url(url())
            .with_header("Content-Type", "text/plain")
            .with_content_length(11u64)
            .build()
            .expect("Valid request");

        assert_eq!(request.method(), "PUT");
        assert_eq!(request.header("content-type"), Some("text/plain"));
        assert_eq!(request.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(request.content_length(), Some(11));
    }

    #[test]
    fn test_builder_rejects_lowercase_method() {
        let result = SignableRequest::builder()
            .with_method("get")
            .with_url(url())
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn test_builder_requires_url() {
        let result = SignableRequest::builder().with_method("GET").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_headers_iterate_sorted() {
        let mut request = SignableRequest::new("GET", url());
        request.set_header("x-ms-version", "2019-02-02");
        request.set_header("X-Ms-Date", "Mon, 01 Jan 2024 00:00:00 GMT");

        let names: Vec<_> = request.headers().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["x-ms-date", "x-ms-version"]);
    }
}
