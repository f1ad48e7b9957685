//! Entity kinds and the structural rules attached to them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of an entity stored in the registry.
///
/// Serialized as its stable integer code so the representation matches the
/// codes used across the storage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum EntityKind {
    /// A user-defined grouping root.
    Hierarchy,
    /// A data table. Owns its columns; deleting it deletes its subtree.
    DataTable,
    /// A grouping node inside a hierarchy.
    Category,
    /// A leaf column. The only kind that may be shared by several parents.
    Column,
}

impl EntityKind {
    /// All storable kinds, in code order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Hierarchy,
        EntityKind::DataTable,
        EntityKind::Category,
        EntityKind::Column,
    ];

    /// Returns the stable integer code for this kind.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            EntityKind::Hierarchy => 0,
            EntityKind::DataTable => 1,
            EntityKind::Category => 2,
            EntityKind::Column => 3,
        }
    }

    /// Looks up a kind by its integer code.
    pub fn from_code(code: i32) -> crate::Result<Self> {
        match code {
            0 => Ok(EntityKind::Hierarchy),
            1 => Ok(EntityKind::DataTable),
            2 => Ok(EntityKind::Category),
            3 => Ok(EntityKind::Column),
            other => Err(crate::Error::InvalidKindCode(other)),
        }
    }

    /// Whether an entity of this kind may have more than one parent.
    ///
    /// Attaching any other kind to a second parent duplicates its subtree.
    #[must_use]
    pub const fn is_shareable(self) -> bool {
        matches!(self, EntityKind::Column)
    }

    /// Whether removing an entity of this kind removes its descendants too.
    #[must_use]
    pub const fn cascades_on_delete(self) -> bool {
        matches!(self, EntityKind::DataTable)
    }

    /// Kind given to a copy of an entity of this kind.
    ///
    /// A copied table becomes a category: only the original table owns its
    /// column set.
    #[must_use]
    pub const fn copy_kind(self) -> Self {
        match self {
            EntityKind::DataTable => EntityKind::Category,
            other => other,
        }
    }

    /// Whether children of this kind may be detached one at a time.
    #[must_use]
    pub const fn allows_child_removal(self) -> bool {
        !matches!(self, EntityKind::DataTable)
    }
}

impl TryFrom<i32> for EntityKind {
    type Error = crate::Error;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<EntityKind> for i32 {
    fn from(kind: EntityKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Hierarchy => "hierarchy",
            EntityKind::DataTable => "table",
            EntityKind::Category => "category",
            EntityKind::Column => "column",
        };
        f.write_str(name)
    }
}

/// Kind restriction for metadata queries.
///
/// `Any` is a query-only wildcard and is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum KindFilter {
    #[default]
    Any,
    Only(EntityKind),
}

impl KindFilter {
    /// Wire code of the wildcard.
    pub const ANY_CODE: i32 = -1;

    /// Returns true if an entity of `kind` passes the filter.
    #[must_use]
    pub fn matches(self, kind: EntityKind) -> bool {
        match self {
            KindFilter::Any => true,
            KindFilter::Only(k) => k == kind,
        }
    }

    /// Returns the restricting kind, or `None` for the wildcard.
    #[must_use]
    pub fn kind(self) -> Option<EntityKind> {
        match self {
            KindFilter::Any => None,
            KindFilter::Only(k) => Some(k),
        }
    }

    /// Returns the integer code (`-1` for the wildcard).
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            KindFilter::Any => Self::ANY_CODE,
            KindFilter::Only(k) => k.code(),
        }
    }
}

impl From<EntityKind> for KindFilter {
    fn from(kind: EntityKind) -> Self {
        KindFilter::Only(kind)
    }
}

impl TryFrom<i32> for KindFilter {
    type Error = crate::Error;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        if code == Self::ANY_CODE {
            Ok(KindFilter::Any)
        } else {
            EntityKind::from_code(code).map(KindFilter::Only)
        }
    }
}

impl From<KindFilter> for i32 {
    fn from(filter: KindFilter) -> Self {
        filter.code()
    }
}
