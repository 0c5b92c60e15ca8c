//! Primary/secondary endpoint pairs and addressing style detection.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use url::{Host, Url};

use crate::location::LocationMode;
use crate::{Error, Result};

/// Ports the local storage emulator listens on; these imply path-style URIs.
pub const EMULATOR_PORTS: RangeInclusive<u16> = 10000..=10004;

/// Which of the two account endpoints a request targets.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StorageLocation {
    /// The read-write primary endpoint.
    #[default]
    Primary,
    /// The read-only secondary endpoint.
    Secondary,
}

impl StorageLocation {
    /// Returns the opposite location.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

/// A primary URI and an optional secondary URI for the same resource.
///
/// Both URIs always carry the same path; only the host differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageUri {
    primary: Url,
    secondary: Option<Url>,
}

impl StorageUri {
    /// Creates a primary-only URI pair.
    pub fn new(primary: Url) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Creates a URI pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the two paths differ.
    pub fn with_secondary(primary: Url, secondary: Url) -> Result<Self> {
        if primary.path() != secondary.path() {
            return Err(Error::invalid_argument(
                "secondary_endpoint",
                format!(
                    "path '{}' does not match primary path '{}'",
                    secondary.path(),
                    primary.path()
                ),
            ));
        }

        Ok(Self {
            primary,
            secondary: Some(secondary),
        })
    }

    /// Parses a primary endpoint and an optional secondary endpoint.
    pub fn parse(primary: &str, secondary: Option<&str>) -> Result<Self> {
        let primary = Url::parse(primary)?;
        match secondary {
            Some(secondary) => Self::with_secondary(primary, Url::parse(secondary)?),
            None => Ok(Self::new(primary)),
        }
    }

    /// Returns the primary URI.
    #[inline]
    pub fn primary(&self) -> &Url {
        &self.primary
    }

    /// Returns the secondary URI, if configured.
    #[inline]
    pub fn secondary(&self) -> Option<&Url> {
        self.secondary.as_ref()
    }

    /// Returns the URI for `location`, if configured.
    pub fn get(&self, location: StorageLocation) -> Option<&Url> {
        match location {
            StorageLocation::Primary => Some(&self.primary),
            StorageLocation::Secondary => self.secondary.as_ref(),
        }
    }

    /// Returns a pair pointing at `path` below this one.
    ///
    /// Slashes in `path` separate segments; every other reserved character
    /// is percent-encoded.
    pub fn append_path(&self, path: &str) -> Result<Self> {
        let primary = append_segments(&self.primary, path)?;
        let secondary = self
            .secondary
            .as_ref()
            .map(|secondary| append_segments(secondary, path))
            .transpose()?;

        Ok(Self { primary, secondary })
    }

    /// Checks that `mode` can be served by the configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `mode` needs a secondary
    /// endpoint and none is configured.
    pub fn validate_location_mode(&self, mode: LocationMode) -> Result<()> {
        if mode.requires_secondary() && self.secondary.is_none() {
            return Err(Error::invalid_argument(
                "location_mode",
                format!("{mode} requires a secondary endpoint"),
            ));
        }

        Ok(())
    }
}

fn append_segments(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::invalid_argument("endpoint", format!("'{base}' cannot be a base URL")))?
        .pop_if_empty()
        .extend(path.split('/'));

    Ok(url)
}

/// Returns whether `url` addresses the account in the path rather than the host.
///
/// IP-address hosts and the emulator ports use `scheme://host:port/account/...`.
pub fn uses_path_style(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        Some(Host::Domain(_)) => url
            .port()
            .is_some_and(|port| EMULATOR_PORTS.contains(&port)),
        None => false,
    }
}

/// Derives the account name from an endpoint.
///
/// Path-style endpoints carry it in the first path segment, host-style
/// endpoints in the first host label.
pub fn account_name_from_endpoint(url: &Url, path_style: bool) -> Option<String> {
    if path_style {
        return url
            .path_segments()?
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
    }

    let (account, _rest) = url.host_str()?.split_once('.')?;
    (!account.is_empty()).then(|| account.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_path_style_detection() {
        assert!(uses_path_style(&url("http://127.0.0.1:10000/devstoreaccount1")));
        assert!(uses_path_style(&url("http://[::1]/devstoreaccount1")));
        assert!(uses_path_style(&url("http://localhost:10002/devstoreaccount1")));
        assert!(!uses_path_style(&url("https://acct.blob.core.windows.net")));
        assert!(!uses_path_style(&url("http://localhost:8080/acct")));
    }

    #[test]
    fn test_account_name_from_endpoint() {
        assert_eq!(
            account_name_from_endpoint(&url("https://acct.blob.core.windows.net"), false),
            Some("acct".to_string())
        );
        assert_eq!(
            account_name_from_endpoint(&url("http://127.0.0.1:10000/devstoreaccount1"), true),
            Some("devstoreaccount1".to_string())
        );
        assert_eq!(
            account_name_from_endpoint(&url("http://127.0.0.1:10000/"), true),
            None
        );
        assert_eq!(account_name_from_endpoint(&url("http://localhost"), false), None);
    }

    #[test]
    fn test_secondary_must_share_path() {
        let primary = url("https://acct.blob.core.windows.net/");
        let secondary = url("https://acct-secondary.blob.core.windows.net/");
        assert!(StorageUri::with_secondary(primary.clone(), secondary).is_ok());

        let mismatched = url("https://acct-secondary.blob.core.windows.net/other");
        assert!(matches!(
            StorageUri::with_secondary(primary, mismatched),
            Err(Error::InvalidArgument {
                argument: "secondary_endpoint",
                ..
            })
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            StorageUri::parse("not a url", None),
            Err(Error::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_append_path() {
        let uri = StorageUri::parse(
            "https://acct.blob.core.windows.net",
            Some("https://acct-secondary.blob.core.windows.net"),
        )
        .unwrap();

        let blob = uri.append_path("container/dir/blob name").unwrap();
        assert_eq!(
            blob.primary().as_str(),
            "https://acct.blob.core.windows.net/container/dir/blob%20name"
        );
        assert_eq!(
            blob.secondary().unwrap().as_str(),
            "https://acct-secondary.blob.core.windows.net/container/dir/blob%20name"
        );
    }

    #[test]
    fn test_append_path_keeps_account_segment() {
        let uri = StorageUri::parse("http://127.0.0.1:10000/devstoreaccount1", None).unwrap();
        let container = uri.append_path("$root").unwrap();
        assert_eq!(
            container.primary().as_str(),
            "http://127.0.0.1:10000/devstoreaccount1/$root"
        );
    }

    #[test]
    fn test_validate_location_mode() {
        let primary_only = StorageUri::parse("https://acct.blob.core.windows.net", None).unwrap();
        assert!(primary_only.validate_location_mode(LocationMode::PrimaryOnly).is_ok());
        assert!(primary_only
            .validate_location_mode(LocationMode::SecondaryOnly)
            .is_err());
        assert!(primary_only
            .validate_location_mode(LocationMode::PrimaryThenSecondary)
            .is_err());
    }

    #[test]
    fn test_location_other() {
        assert_eq!(StorageLocation::Primary.other(), StorageLocation::Secondary);
        assert_eq!(StorageLocation::Secondary.other(), StorageLocation::Primary);
    }
}
