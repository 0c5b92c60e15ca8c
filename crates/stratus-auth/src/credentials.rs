//! Storage account credentials.
//!
//! Credentials know the account identity and how to authorize a request,
//! but not which canonical layout to use: the caller hands them the
//! canonicalizer selected for the client's scheme and service family.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::canonicalizer::Canonicalizer;
use crate::request::SignableRequest;
use crate::{Error, Result, TRACING_TARGET_SIGNING};

type HmacSha256 = Hmac<Sha256>;

/// Credentials used to authorize requests against a storage account.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageCredentials {
    /// No authorization; only public resources are reachable.
    Anonymous,
    /// Account name and decoded account key for shared-key signing.
    SharedKey {
        /// Storage account name.
        account_name: String,
        /// Decoded account key bytes.
        key: Vec<u8>,
    },
    /// Pre-issued shared access signature query string.
    SasToken {
        /// Token without a leading `?`.
        token: String,
    },
}

impl StorageCredentials {
    /// Creates shared-key credentials from an account name and base64 key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] for an empty name or key and
    /// [`Error::InvalidArgument`] when the key is not valid base64.
    pub fn shared_key(account_name: impl Into<String>, account_key: &str) -> Result<Self> {
        let account_name = account_name.into();
        stratus_core::bounds::assert_not_empty("account_name", &account_name)?;
        stratus_core::bounds::assert_not_empty("account_key", account_key)?;

        let key = STANDARD
            .decode(account_key)
            .map_err(|e| Error::invalid_argument("account_key", e.to_string()))?;

        Ok(Self::SharedKey { account_name, key })
    }

    /// Creates SAS credentials; a leading `?` is stripped.
    pub fn sas_token(token: impl AsRef<str>) -> Result<Self> {
        let token = token.as_ref().trim_start_matches('?');
        stratus_core::bounds::assert_not_empty("sas_token", token)?;

        Ok(Self::SasToken {
            token: token.to_string(),
        })
    }

    /// Returns the embedded account name, if these credentials carry one.
    #[inline]
    pub fn account_name(&self) -> Option<&str> {
        match self {
            Self::SharedKey { account_name, .. } => Some(account_name),
            Self::Anonymous | Self::SasToken { .. } => None,
        }
    }

    /// Returns whether requests go out unauthenticated.
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns whether requests are signed with an account key.
    #[inline]
    pub fn is_shared_key(&self) -> bool {
        matches!(self, Self::SharedKey { .. })
    }

    /// Returns a masked version of the account key for logging.
    ///
    /// This shows only the first 4 characters of the encoded key.
    pub fn account_key_masked(&self) -> Option<String> {
        let Self::SharedKey { key, .. } = self else {
            return None;
        };

        let encoded = STANDARD.encode(key);
        if encoded.len() <= 4 {
            Some("*".repeat(encoded.len()))
        } else {
            Some(format!("{}***", &encoded[..4]))
        }
    }

    /// Signs `string_to_sign` with the account key, returning base64.
    ///
    /// Returns `None` for credentials without a key.
    pub fn compute_signature(&self, string_to_sign: &str) -> Option<String> {
        let Self::SharedKey { key, .. } = self else {
            return None;
        };

        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
        mac.update(string_to_sign.as_bytes());

        Some(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Authorizes `request` in place.
    ///
    /// Shared-key credentials set the `Authorization` header using the
    /// string `canonicalizer` builds; SAS credentials append the token to
    /// the query; anonymous credentials leave the request untouched.
    pub fn authorize(&self, request: &mut SignableRequest, canonicalizer: &dyn Canonicalizer) {
        match self {
            Self::Anonymous => {}
            Self::SasToken { token } => {
                let query = match request.url().query() {
                    Some(existing) if !existing.is_empty() => format!("{existing}&{token}"),
                    _ => token.clone(),
                };
                request.url_mut().set_query(Some(&query));
            }
            Self::SharedKey { account_name, .. } => {
                let string_to_sign = canonicalizer.canonicalize(request, account_name);
                let signature = self
                    .compute_signature(&string_to_sign)
                    .unwrap_or_default();

                tracing::trace!(
                    target: TRACING_TARGET_SIGNING,
                    scheme = canonicalizer.authorization_scheme(),
                    family = %canonicalizer.family(),
                    method = request.method(),
                    "Signed request"
                );

                request.set_header(
                    "authorization",
                    format!(
                        "{} {account_name}:{signature}",
                        canonicalizer.authorization_scheme()
                    ),
                );
            }
        }
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::SharedKey { account_name, .. } => f
                .debug_struct("SharedKey")
                .field("account_name", account_name)
                .field("key", &self.account_key_masked())
                .finish(),
            Self::SasToken { .. } => f.debug_struct("SasToken").finish_non_exhaustive(),
        }
    }
}
