//! Identifier type used throughout the arbor core.
//!
//! Ids are positive integers handed out by the registry. They are never
//! reused within the lifetime of a store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an entity in the metadata store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// Raw value used by clients to address "the root", i.e. the set of
    /// entities that have no parent at all.
    pub const ROOT_SENTINEL: i64 = -1;

    /// Wraps a raw id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Interprets a raw parent reference coming from a client.
    ///
    /// The root sentinel maps to `None`, any other value to `Some(id)`.
    #[must_use]
    pub fn as_parent(raw: i64) -> Option<Self> {
        if raw == Self::ROOT_SENTINEL {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Parses an entity id from a string.
    pub fn parse(s: &str) -> crate::Result<Self> {
        s.parse()
    }
}

impl From<i64> for EntityId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| crate::Error::InvalidId(s.to_string()))
    }
}
