//! Incremental change detection against the snapshot store.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::category::Category;
use crate::error::{Error, Result};
use crate::introspect::{
    DiscoveredMember, EntityId, MemberKey, MemberTagger, TypeIntrospector, discover_member,
};
use crate::snapshot::SnapshotStore;
use crate::value::{approx_equal, format_value};

/// One observed member change. Produced per cycle, written out, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub entity: String,
    pub member: String,
    pub old: String,
    pub new: String,
    pub tags: Vec<String>,
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}: {} -> {}",
            self.entity, self.member, self.old, self.new
        )?;
        if !self.tags.is_empty() {
            write!(f, " [{}]", self.tags.join(", "))?;
        }
        Ok(())
    }
}

/// Result of one detection pass over an entity
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub entity: String,
    pub changes: Vec<ChangeRecord>,
    /// Members that appeared on an already-known entity
    pub new_members: Vec<DiscoveredMember>,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.new_members.is_empty()
    }
}

/// Members seen so far per (category, entity)
#[derive(Debug, Default)]
pub struct KnownMembers {
    seen: HashMap<Category, HashMap<EntityId, HashSet<MemberKey>>>,
}

impl KnownMembers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn knows_entity(&self, category: Category, entity: EntityId) -> bool {
        self.seen
            .get(&category)
            .is_some_and(|m| m.contains_key(&entity))
    }

    fn members_mut(&mut self, category: Category, entity: EntityId) -> &mut HashSet<MemberKey> {
        self.seen
            .entry(category)
            .or_default()
            .entry(entity)
            .or_default()
    }

    pub fn clear(&mut self, category: Category) {
        self.seen.remove(&category);
    }
}

pub struct ChangeDetector<'a, H: TypeIntrospector + ?Sized> {
    host: &'a H,
    tagger: &'a MemberTagger,
}

impl<'a, H: TypeIntrospector + ?Sized> ChangeDetector<'a, H> {
    pub fn new(host: &'a H, tagger: &'a MemberTagger) -> Self {
        Self { host, tagger }
    }

    /// Compare an entity's current member values with the stored snapshots.
    ///
    /// A member without a snapshot is stored silently (first observation).
    /// Read failures skip the member for this pass. A member appearing on an
    /// entity that was already known is reported in
    /// [`Detection::new_members`] instead of being diffed.
    ///
    /// Fails with [`Error::InvalidEntity`] if the host destroyed the entity.
    pub fn detect(
        &self,
        category: Category,
        entity: EntityId,
        snapshots: &mut SnapshotStore,
        known: &mut KnownMembers,
    ) -> Result<Detection> {
        if !self.host.is_valid(entity) {
            return Err(Error::InvalidEntity(entity));
        }

        let display_name = self.host.display_name(entity)?;
        let members = self.host.list_members(entity)?;
        let entity_known = known.knows_entity(category, entity);
        let seen = known.members_mut(category, entity);

        let mut detection = Detection {
            entity: display_name,
            ..Default::default()
        };
        let mut fresh = Vec::new();

        for descriptor in &members {
            let newly_seen = seen.insert(descriptor.key());
            if newly_seen && entity_known {
                fresh.push(descriptor);
                continue;
            }
            if !descriptor.is_data() || !descriptor.readable {
                continue;
            }

            let current = match self.host.read_member(entity, descriptor) {
                Ok(v) => v,
                Err(e) if e.is_invalid_entity() => return Err(e),
                Err(_) => continue,
            };

            let type_name = &descriptor.declaring_type;
            let name = &descriptor.name;
            match snapshots.get(category, entity, type_name, name) {
                None => {
                    snapshots.set(category, entity, type_name, name, current);
                }
                Some(previous) if !approx_equal(previous, &current) => {
                    detection.changes.push(ChangeRecord {
                        entity: detection.entity.clone(),
                        member: name.clone(),
                        old: format_value(previous),
                        new: format_value(&current),
                        tags: self.tagger.tags_for(name),
                    });
                    snapshots.set(category, entity, type_name, name, current);
                }
                Some(_) => {}
            }
        }

        for descriptor in fresh {
            let member = discover_member(self.host, entity, descriptor, self.tagger)?;
            if let Some(value) = member.value.value() {
                snapshots.set(
                    category,
                    entity,
                    &descriptor.declaring_type,
                    &descriptor.name,
                    value.clone(),
                );
            }
            detection.new_members.push(member);
        }

        Ok(detection)
    }
}
