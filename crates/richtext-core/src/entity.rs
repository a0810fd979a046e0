//! Out-of-line entities and the entity registry.
//!
//! An [`Entity`] is an object referenced from block entity ranges by a
//! stable key (a link target, an embed, a mention, ...). The registry is an
//! immutable value: creating or updating an entity produces a new
//! [`EntityMap`]. Entities that lose their last reference are never
//! garbage-collected; a snapshot only ever supersedes, it does not delete.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::document::StructuralViolation;

/// Stable identity of an entity, independent of any block.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey(String);

impl EntityKey {
    /// Wrap an explicit key (e.g. one read back from a raw snapshot).
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// How the pipeline treats edits that touch an entity range boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutability {
    /// The annotated text cannot be partially edited; the range survives or
    /// dies whole.
    Immutable,
    /// The annotated text may be edited freely; the range follows the text.
    Mutable,
    /// The annotated text is edited in delimiter-separated segments.
    Segmented,
}

impl Mutability {
    /// The wire tag for this mutability class.
    pub fn as_tag(&self) -> &str {
        match self {
            Mutability::Immutable => "IMMUTABLE",
            Mutability::Mutable => "MUTABLE",
            Mutability::Segmented => "SEGMENTED",
        }
    }

    /// Parse a wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "IMMUTABLE" => Some(Mutability::Immutable),
            "MUTABLE" => Some(Mutability::Mutable),
            "SEGMENTED" => Some(Mutability::Segmented),
            _ => None,
        }
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// An out-of-line object referenced from block entity ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    entity_type: String,
    mutability: Mutability,
    data: IndexMap<String, String>,
}

impl Entity {
    /// Create an entity with no associated data.
    pub fn new(entity_type: impl Into<String>, mutability: Mutability) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability,
            data: IndexMap::new(),
        }
    }

    /// Add one data pair (builder style).
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// The entity's type tag.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The entity's mutability class.
    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    /// The ordered opaque data mapping.
    pub fn data(&self) -> &IndexMap<String, String> {
        &self.data
    }
}

/// Immutable entity registry keyed by [`EntityKey`].
///
/// Generated keys are monotonically increasing decimal strings within a
/// registry lineage and are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMap {
    entities: Arc<IndexMap<EntityKey, Arc<Entity>>>,
    next_key: u64,
}

impl Default for EntityMap {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMap {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entities: Arc::new(IndexMap::new()),
            next_key: 1,
        }
    }

    /// Register a new entity, returning the new registry and the assigned
    /// key.
    pub fn create(&self, entity: Entity) -> (Self, EntityKey) {
        let key = EntityKey::new(self.next_key.to_string());
        let mut entities = (*self.entities).clone();
        entities.insert(key.clone(), Arc::new(entity));
        (
            Self {
                entities: Arc::new(entities),
                next_key: self.next_key + 1,
            },
            key,
        )
    }

    /// Register an entity under an explicit key (used when restoring a raw
    /// snapshot). Numeric keys advance the generator past them.
    pub fn insert(&self, key: EntityKey, entity: Entity) -> Self {
        let mut entities = (*self.entities).clone();
        let next_key = match key.as_str().parse::<u64>() {
            Ok(n) => self.next_key.max(n + 1),
            Err(_) => self.next_key,
        };
        entities.insert(key, Arc::new(entity));
        Self {
            entities: Arc::new(entities),
            next_key,
        }
    }

    /// Exact lookup.
    pub fn get(&self, key: &EntityKey) -> Option<&Entity> {
        self.entities.get(key).map(|e| e.as_ref())
    }

    /// Whether the registry holds an entity under `key`.
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &Entity)> {
        self.entities.iter().map(|(k, e)| (k, e.as_ref()))
    }

    /// Merge data pairs into an existing entity.
    pub fn merge_data<I, K, V>(&self, key: &EntityKey, pairs: I) -> Result<Self, StructuralViolation>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let current = self
            .entities
            .get(key)
            .ok_or_else(|| StructuralViolation::UnknownEntity(key.clone()))?;

        let mut entity = (**current).clone();
        for (k, v) in pairs {
            entity.data.insert(k.into(), v.into());
        }

        let mut entities = (*self.entities).clone();
        entities.insert(key.clone(), Arc::new(entity));
        Ok(Self {
            entities: Arc::new(entities),
            next_key: self.next_key,
        })
    }

    /// Replace an existing entity's data wholesale.
    pub fn replace_data(
        &self,
        key: &EntityKey,
        data: IndexMap<String, String>,
    ) -> Result<Self, StructuralViolation> {
        let current = self
            .entities
            .get(key)
            .ok_or_else(|| StructuralViolation::UnknownEntity(key.clone()))?;

        let mut entity = (**current).clone();
        entity.data = data;

        let mut entities = (*self.entities).clone();
        entities.insert(key.clone(), Arc::new(entity));
        Ok(Self {
            entities: Arc::new(entities),
            next_key: self.next_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_increasing_keys() {
        let map = EntityMap::new();
        let (map, k1) = map.create(Entity::new("LINK", Mutability::Mutable));
        let (map, k2) = map.create(Entity::new("LINK", Mutability::Mutable));
        assert_eq!(k1.as_str(), "1");
        assert_eq!(k2.as_str(), "2");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn insert_advances_generator_past_numeric_keys() {
        let map = EntityMap::new().insert(
            EntityKey::new("7"),
            Entity::new("IMAGE", Mutability::Immutable),
        );
        let (_, key) = map.create(Entity::new("LINK", Mutability::Mutable));
        assert_eq!(key.as_str(), "8");
    }

    #[test]
    fn merge_data_preserves_order_and_prior_pairs() {
        let entity = Entity::new("LINK", Mutability::Mutable).with_data("url", "https://a.example");
        let (map, key) = EntityMap::new().create(entity);
        let map = map
            .merge_data(&key, [("title", "A"), ("url", "https://b.example")])
            .unwrap();

        let entity = map.get(&key).unwrap();
        let pairs: Vec<_> = entity.data().iter().collect();
        assert_eq!(pairs[0], (&"url".to_string(), &"https://b.example".to_string()));
        assert_eq!(pairs[1], (&"title".to_string(), &"A".to_string()));
    }

    #[test]
    fn merge_data_unknown_key_is_a_violation() {
        let map = EntityMap::new();
        let err = map
            .merge_data(&EntityKey::new("9"), [("a", "b")])
            .unwrap_err();
        assert!(matches!(err, StructuralViolation::UnknownEntity(_)));
    }

    #[test]
    fn old_snapshots_keep_superseded_data() {
        let (map, key) = EntityMap::new()
            .create(Entity::new("LINK", Mutability::Mutable).with_data("url", "old"));
        let updated = map.merge_data(&key, [("url", "new")]).unwrap();

        assert_eq!(map.get(&key).unwrap().data()["url"], "old");
        assert_eq!(updated.get(&key).unwrap().data()["url"], "new");
    }
}
