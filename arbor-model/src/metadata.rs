use crate::keys::private;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// String-keyed attribute values for one namespace of one entity.
pub type AttributeMap = HashMap<String, String>;

const PUBLIC_METADATA: &str = "publicMetadata";
const PRIVATE_METADATA: &str = "privateMetadata";

/// Public and private attributes of an entity.
///
/// Used both as a full snapshot (inside [`crate::Entity`]) and as a diff
/// passed to `update_entity`, where absent keys are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    #[serde(rename = "publicMetadata", default)]
    pub public: AttributeMap,
    #[serde(rename = "privateMetadata", default)]
    pub private: AttributeMap,
}

impl EntityMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds metadata from a `{"publicMetadata": {..}, "privateMetadata": {..}}`
    /// map. Missing namespaces are empty.
    pub fn from_map(mut map: HashMap<String, AttributeMap>) -> Self {
        Self {
            public: map.remove(PUBLIC_METADATA).unwrap_or_default(),
            private: map.remove(PRIVATE_METADATA).unwrap_or_default(),
        }
    }

    /// Adds a public attribute.
    pub fn with_public(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.public.insert(key.into(), value.into());
        self
    }

    /// Adds a private attribute.
    pub fn with_private(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.private.insert(key.into(), value.into());
        self
    }

    /// Returns true if neither namespace has any entry.
    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.private.is_empty()
    }

    /// Returns a copy with the private keys that never leave the server
    /// (`connection`, `sqlQuery`) removed.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            public: self.public.clone(),
            private: self
                .private
                .iter()
                .filter(|(k, _)| !private::is_secret(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}
