//! Region keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque region key selecting a holiday calendar and a rate multiplier.
///
/// Keys are normalized to upper case (`"my"` and `"MY"` are the same
/// region). Nothing here knows which keys are valid; that is decided by
/// whichever [`CalendarRegistry`](super::CalendarRegistry) or
/// [`RateCard`](crate::costing::RateCard) the key is looked up in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Region(String);

impl Region {
    /// Malaysia.
    pub const MALAYSIA: &'static str = "MY";
    /// Singapore.
    pub const SINGAPORE: &'static str = "SG";
    /// Vietnam.
    pub const VIETNAM: &'static str = "VN";

    /// Creates a region key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_ascii_uppercase())
    }

    pub fn malaysia() -> Self {
        Self::new(Self::MALAYSIA)
    }

    pub fn singapore() -> Self {
        Self::new(Self::SINGAPORE)
    }

    pub fn vietnam() -> Self {
        Self::new(Self::VIETNAM)
    }

    /// The normalized key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Region {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl From<&str> for Region {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
