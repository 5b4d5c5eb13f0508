#![forbid(unsafe_code)]

//! Platform collaborator.
//!
//! The host's default contract is the device orientation. Orientation
//! detection belongs to the hosting environment and is injected through
//! [`PlatformOperations`]; a host that needs it and does not get it fails at
//! construction with [`ViewError::MissingCollaborator`].
//!
//! [`ViewError::MissingCollaborator`]: crate::ViewError::MissingCollaborator

use std::fmt;

use crate::contract::Contract;

/// Device orientation as reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Upright portrait.
    Portrait,
    /// Upside-down portrait.
    PortraitUpsideDown,
    /// Landscape, rotated left.
    LandscapeLeft,
    /// Landscape, rotated right.
    LandscapeRight,
}

impl Orientation {
    /// Name used as a view contract.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::PortraitUpsideDown => "PortraitUpsideDown",
            Self::LandscapeLeft => "LandscapeLeft",
            Self::LandscapeRight => "LandscapeRight",
        }
    }

    /// Whether the orientation is one of the landscape variants.
    #[must_use]
    pub const fn is_landscape(self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Orientation> for Contract {
    fn from(orientation: Orientation) -> Self {
        Contract::new(orientation.as_str())
    }
}

impl From<Option<Orientation>> for Contract {
    fn from(orientation: Option<Orientation>) -> Self {
        orientation.map_or_else(Contract::none, Contract::from)
    }
}

/// Platform services the hosts consume.
pub trait PlatformOperations {
    /// Current orientation, or `None` when the platform has no notion of one.
    fn orientation(&self) -> Option<Orientation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_maps_to_named_contract() {
        assert_eq!(Contract::from(Orientation::Portrait), Contract::new("Portrait"));
        assert_eq!(
            Contract::from(Some(Orientation::LandscapeLeft)).as_str(),
            Some("LandscapeLeft")
        );
    }

    #[test]
    fn unknown_orientation_is_default_contract() {
        assert!(Contract::from(None::<Orientation>).is_default());
    }

    #[test]
    fn landscape_detection() {
        assert!(Orientation::LandscapeRight.is_landscape());
        assert!(!Orientation::PortraitUpsideDown.is_landscape());
    }
}
