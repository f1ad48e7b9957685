use crate::StorageResult;
use arbor_model::AttributeMap;
use arbor_types::EntityId;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Which attribute namespace a table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Visible to every consumer.
    Public,
    /// Restricted to trusted callers.
    Private,
}

impl Namespace {
    pub const BOTH: [Namespace; 2] = [Namespace::Public, Namespace::Private];

    /// Suffix of the physical table name for this namespace.
    pub const fn table_suffix(self) -> &'static str {
        match self {
            Namespace::Public => "meta_public",
            Namespace::Private => "meta_private",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Public => f.write_str("public"),
            Namespace::Private => f.write_str("private"),
        }
    }
}

/// Sparse `id -> (key -> value)` storage for one namespace.
pub trait AttributeTable: Send {
    /// The namespace this table holds.
    fn namespace(&self) -> Namespace;

    /// Upserts one attribute.
    ///
    /// Only non-empty values are stored: an empty `value` removes the key
    /// instead of storing `""`, so reading it back yields no entry rather
    /// than an empty string.
    fn set(&mut self, id: EntityId, key: &str, value: &str) -> StorageResult<()>;

    /// Batch read. Every requested id is present in the result, with an
    /// empty map when it has no attributes.
    fn get(&self, ids: &[EntityId]) -> StorageResult<HashMap<EntityId, AttributeMap>>;

    /// Every id carrying `key`, with its value.
    fn values_of(&self, key: &str) -> StorageResult<HashMap<EntityId, String>>;

    /// Ids whose attributes contain every pair of `criteria` with an exactly
    /// equal value. Empty criteria match nothing.
    fn filter(&self, criteria: &AttributeMap) -> StorageResult<HashSet<EntityId>>;

    /// Removes every attribute of `id`.
    fn clear(&mut self, id: EntityId) -> StorageResult<()>;
}
