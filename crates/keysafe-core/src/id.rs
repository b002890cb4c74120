//! Owner identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of the account that owns a secret.
///
/// Keysafe never checks that the id belongs to a live account; that is the
/// job of the settings store's owner registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Wrap a raw account id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw account id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for OwnerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}
