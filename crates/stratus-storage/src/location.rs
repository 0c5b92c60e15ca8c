//! Primary/secondary selection policy.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::endpoint::StorageLocation;

/// Policy for choosing between the primary and secondary endpoint per attempt.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr
)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LocationMode {
    /// Every attempt goes to the primary endpoint.
    #[default]
    PrimaryOnly,
    /// Start at the primary endpoint and alternate on retry.
    PrimaryThenSecondary,
    /// Every attempt goes to the secondary endpoint.
    SecondaryOnly,
    /// Start at the secondary endpoint and alternate on retry.
    SecondaryThenPrimary,
}

impl LocationMode {
    /// Location of the first attempt.
    pub fn initial_location(self) -> StorageLocation {
        match self {
            Self::PrimaryOnly | Self::PrimaryThenSecondary => StorageLocation::Primary,
            Self::SecondaryOnly | Self::SecondaryThenPrimary => StorageLocation::Secondary,
        }
    }

    /// Location of the attempt following one made at `current`.
    pub fn next_location(self, current: StorageLocation) -> StorageLocation {
        match self {
            Self::PrimaryOnly => StorageLocation::Primary,
            Self::SecondaryOnly => StorageLocation::Secondary,
            Self::PrimaryThenSecondary | Self::SecondaryThenPrimary => current.other(),
        }
    }

    /// Returns whether this mode ever targets the secondary endpoint.
    #[inline]
    pub fn requires_secondary(self) -> bool {
        !matches!(self, Self::PrimaryOnly)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_initial_location() {
        assert_eq!(
            LocationMode::PrimaryOnly.initial_location(),
            StorageLocation::Primary
        );
        assert_eq!(
            LocationMode::SecondaryThenPrimary.initial_location(),
            StorageLocation::Secondary
        );
    }

    #[test]
    fn test_next_location_alternates_only_for_then_modes() {
        let mode = LocationMode::PrimaryThenSecondary;
        let second = mode.next_location(mode.initial_location());
        assert_eq!(second, StorageLocation::Secondary);
        assert_eq!(mode.next_location(second), StorageLocation::Primary);

        assert_eq!(
            LocationMode::SecondaryOnly.next_location(StorageLocation::Secondary),
            StorageLocation::Secondary
        );
        assert_eq!(
            LocationMode::PrimaryOnly.next_location(StorageLocation::Primary),
            StorageLocation::Primary
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            LocationMode::from_str("secondary_only").unwrap(),
            LocationMode::SecondaryOnly
        );
        assert_eq!(LocationMode::default(), LocationMode::PrimaryOnly);
    }
}
