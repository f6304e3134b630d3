//! Common type definitions shared across the wireplan crates.

use std::fmt;
use std::str::FromStr;

use crate::WirePlanError;

/// A serialized representation a plan is expressed against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Tree-structured textual format (JSON).
    Json,
    /// Tagged hierarchical markup format (XML).
    Xml,
}

impl WireFormat {
    /// All supported wire formats.
    pub const ALL: [Self; 2] = [Self::Json, Self::Xml];

    /// Get the canonical lowercase name of the format.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireFormat {
    type Err = WirePlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            _ => Err(WirePlanError::UnknownFormat(s.to_owned())),
        }
    }
}
