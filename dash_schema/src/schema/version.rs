//! Dashboard event schema versions

use super::error::{EventFamily, MigrationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known event schema versions, ordered oldest to newest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[serde(rename = "20220614")]
    V20220614,
    #[serde(rename = "20220929")]
    V20220929,
    #[serde(rename = "20221222")]
    V20221222,
}

impl SchemaVersion {
    pub const LATEST: SchemaVersion = SchemaVersion::V20221222;

    pub const ALL: [SchemaVersion; 3] = [
        SchemaVersion::V20220614,
        SchemaVersion::V20220929,
        SchemaVersion::V20221222,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V20220614 => "20220614",
            SchemaVersion::V20220929 => "20220929",
            SchemaVersion::V20221222 => "20221222",
        }
    }

    pub fn is_latest(&self) -> bool {
        *self == Self::LATEST
    }

    /// Parse a version string on behalf of an event family
    pub fn parse_for(value: &str, family: EventFamily) -> Result<Self, MigrationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|version| version.as_str() == value)
            .ok_or_else(|| MigrationError::unsupported(family, value))
    }
}

impl FromStr for SchemaVersion {
    type Err = MigrationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_for(value, EventFamily::Panel)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
