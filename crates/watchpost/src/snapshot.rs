//! Last-observed member values, partitioned per category.
//!
//! By default a slot is keyed by (type name, member name) only, so two
//! instances of the same type in one category share a slot and can mask each
//! other's changes. [`SnapshotScope::PerEntity`] adds the instance identity to
//! the key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::introspect::EntityId;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotScope {
    /// One slot per (type, member)
    #[default]
    PerType,
    /// One slot per (entity, type, member)
    PerEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SlotKey {
    type_name: String,
    member: String,
    instance: Option<EntityId>,
}

/// Absence of an entry means "never observed", not "observed as null"
#[derive(Debug, Default)]
pub struct SnapshotStore {
    scope: SnapshotScope,
    partitions: HashMap<Category, HashMap<SlotKey, Value>>,
}

impl SnapshotStore {
    pub fn new(scope: SnapshotScope) -> Self {
        Self {
            scope,
            partitions: HashMap::new(),
        }
    }

    pub fn scope(&self) -> SnapshotScope {
        self.scope
    }

    fn key(&self, entity: EntityId, type_name: &str, member: &str) -> SlotKey {
        SlotKey {
            type_name: type_name.to_string(),
            member: member.to_string(),
            instance: match self.scope {
                SnapshotScope::PerType => None,
                SnapshotScope::PerEntity => Some(entity),
            },
        }
    }

    /// Last value seen for the member. `entity` only matters under
    /// [`SnapshotScope::PerEntity`].
    pub fn get(
        &self,
        category: Category,
        entity: EntityId,
        type_name: &str,
        member: &str,
    ) -> Option<&Value> {
        self.partitions
            .get(&category)?
            .get(&self.key(entity, type_name, member))
    }

    /// Store a value, returning the one it replaced
    pub fn set(
        &mut self,
        category: Category,
        entity: EntityId,
        type_name: &str,
        member: &str,
        value: Value,
    ) -> Option<Value> {
        let key = self.key(entity, type_name, member);
        self.partitions
            .entry(category)
            .or_default()
            .insert(key, value)
    }

    pub fn clear(&mut self, category: Category) {
        self.partitions.remove(&category);
    }

    pub fn len(&self, category: Category) -> usize {
        self.partitions.get(&category).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.values().all(HashMap::is_empty)
    }
}
