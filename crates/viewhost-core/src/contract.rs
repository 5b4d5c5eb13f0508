#![forbid(unsafe_code)]

//! View contracts.
//!
//! A [`Contract`] disambiguates several views registered for one view-model
//! type ("tablet" vs "phone", "Portrait" vs "Landscape"). The absent
//! contract is its own value: it names the default registration, which is
//! what a contract lookup falls back to.
//!
//! An empty string normalizes to the absent contract, so `Contract::new("")`
//! and `Contract::none()` compare equal.

use std::fmt;

/// Optional view-selection tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Contract(Option<String>);

impl Contract {
    /// The default (absent) contract.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// A named contract. Empty names become [`Contract::none`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Self(None)
        } else {
            Self(Some(name))
        }
    }

    /// The contract name, or `None` for the default contract.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether this is the default contract.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0.is_none()
    }
}

impl From<&str> for Contract {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Contract {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<Option<String>> for Contract {
    fn from(name: Option<String>) -> Self {
        name.map_or_else(Self::none, Self::new)
    }
}

impl From<Option<&str>> for Contract {
    fn from(name: Option<&str>) -> Self {
        name.map_or_else(Self::none, Self::new)
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => f.write_str(name),
            None => f.write_str("<default>"),
        }
    }
}
