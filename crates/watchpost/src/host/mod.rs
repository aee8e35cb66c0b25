//! In-memory host driven by a descriptor table.
//!
//! [`ScriptedHost`] registers each host type once with its member
//! descriptors, holds entity values and the parent/child relation, and can
//! replay a frame script (see [`SceneScript`]) one frame per refresh. It backs
//! the tests and the CLI.

mod script;

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;

use tracing::debug;

use crate::category::Category;
use crate::error::{Error, Result};
use crate::introspect::{EntityId, MemberDescriptor, SceneEvent, SceneProvider, TypeIntrospector};
use crate::value::Value;

pub use script::{
    AttachMember, EntitySpec, FailMember, Frame, MemberSpec, SceneScript, SetValue, TypeSpec,
};

#[derive(Debug, Clone)]
struct HostEntity {
    name: String,
    type_name: String,
    children: Vec<EntityId>,
    attached: Vec<MemberDescriptor>,
    values: HashMap<String, Value>,
    failures: HashMap<String, String>,
    alive: bool,
}

#[derive(Debug, Default)]
pub struct ScriptedHost {
    types: HashMap<String, Vec<MemberDescriptor>>,
    entities: BTreeMap<EntityId, HostEntity>,
    roots: HashMap<Category, Vec<EntityId>>,
    frames: VecDeque<Frame>,
    next_id: u64,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Register a type and its members, replacing any earlier definition
    pub fn define_type(&mut self, name: &str, members: Vec<MemberDescriptor>) {
        self.types.insert(name.to_string(), members);
    }

    /// Create a new top-level entity of a registered type
    pub fn spawn(&mut self, name: &str, type_name: &str) -> Result<EntityId> {
        let id = EntityId(self.next_id);
        self.insert_entity(id, name, type_name)?;
        Ok(id)
    }

    /// Create an entity and append it to `parent`'s children
    pub fn spawn_child(
        &mut self,
        parent: EntityId,
        name: &str,
        type_name: &str,
    ) -> Result<EntityId> {
        if !self.entities.contains_key(&parent) {
            return Err(Error::UnknownEntity(parent));
        }
        let id = self.spawn(name, type_name)?;
        if let Some(p) = self.entities.get_mut(&parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Insert an entity with a caller-chosen id
    pub fn insert_entity(&mut self, id: EntityId, name: &str, type_name: &str) -> Result<()> {
        if !self.types.contains_key(type_name) {
            return Err(Error::UnknownType(type_name.to_string()));
        }
        self.entities.insert(
            id,
            HostEntity {
                name: name.to_string(),
                type_name: type_name.to_string(),
                children: Vec::new(),
                attached: Vec::new(),
                values: HashMap::new(),
                failures: HashMap::new(),
                alive: true,
            },
        );
        self.next_id = self.next_id.max(id.0 + 1);
        Ok(())
    }

    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        self.entity_mut(parent)?.children.push(child);
        Ok(())
    }

    pub fn add_root(&mut self, category: Category, entity: EntityId) {
        self.roots.entry(category).or_default().push(entity);
    }

    pub fn set_value(&mut self, entity: EntityId, member: &str, value: Value) -> Result<()> {
        let e = self.entity_mut(entity)?;
        e.failures.remove(member);
        e.values.insert(member.to_string(), value);
        Ok(())
    }

    /// Make every subsequent read of `member` fail with `message`
    pub fn fail_member(&mut self, entity: EntityId, member: &str, message: &str) -> Result<()> {
        self.entity_mut(entity)?
            .failures
            .insert(member.to_string(), message.to_string());
        Ok(())
    }

    /// Attach an instance-level member (e.g. a behavior added at runtime)
    pub fn attach_member(&mut self, entity: EntityId, member: MemberDescriptor) -> Result<()> {
        self.entity_mut(entity)?.attached.push(member);
        Ok(())
    }

    /// Invalidate a handle the way the host destroys an object
    pub fn destroy(&mut self, entity: EntityId) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.alive = false;
        }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push_back(frame);
    }

    pub fn frames_remaining(&self) -> usize {
        self.frames.len()
    }

    /// Look up a live entity by display name
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, e)| e.alive && e.name == name)
            .map(|(id, _)| *id)
    }

    /// Build a host from a JSON scene script
    pub fn from_json(json: &str) -> Result<Self> {
        let script: SceneScript = serde_json::from_str(json)?;
        script.into_host()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn entity_mut(&mut self, entity: EntityId) -> Result<&mut HostEntity> {
        self.entities
            .get_mut(&entity)
            .ok_or(Error::UnknownEntity(entity))
    }

    fn live(&self, entity: EntityId) -> Result<&HostEntity> {
        match self.entities.get(&entity) {
            Some(e) if e.alive => Ok(e),
            _ => Err(Error::InvalidEntity(entity)),
        }
    }
}

impl TypeIntrospector for ScriptedHost {
    fn is_valid(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.alive)
    }

    fn type_name(&self, entity: EntityId) -> Result<String> {
        Ok(self.live(entity)?.type_name.clone())
    }

    fn display_name(&self, entity: EntityId) -> Result<String> {
        Ok(self.live(entity)?.name.clone())
    }

    fn list_members(&self, entity: EntityId) -> Result<Vec<MemberDescriptor>> {
        let e = self.live(entity)?;
        let declared = self
            .types
            .get(&e.type_name)
            .ok_or_else(|| Error::UnknownType(e.type_name.clone()))?;
        Ok(declared.iter().chain(e.attached.iter()).cloned().collect())
    }

    fn read_member(&self, entity: EntityId, member: &MemberDescriptor) -> Result<Value> {
        let e = self.live(entity)?;
        if !member.is_data() || !member.readable {
            return Err(Error::MemberNotReadable(member.name.clone()));
        }
        if let Some(message) = e.failures.get(&member.name) {
            return Err(Error::MemberRead {
                member: member.name.clone(),
                message: message.clone(),
            });
        }
        Ok(e.values.get(&member.name).cloned().unwrap_or(Value::Null))
    }
}

impl SceneProvider for ScriptedHost {
    fn roots(&self, category: Category) -> Vec<EntityId> {
        self.roots.get(&category).cloned().unwrap_or_default()
    }

    fn children_of(&self, entity: EntityId) -> Vec<EntityId> {
        self.entities
            .get(&entity)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    fn scene_entities(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.alive)
            .map(|(id, _)| *id)
            .collect()
    }

    fn refresh(&mut self) -> SceneEvent {
        let Some(frame) = self.frames.pop_front() else {
            return SceneEvent::Unchanged;
        };
        debug!("Applying scripted frame ({} left)", self.frames.len());
        frame.apply(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> ScriptedHost {
        let mut host = ScriptedHost::new();
        host.define_type(
            "Enemy",
            vec![MemberDescriptor::field("Enemy", "Health", "int")],
        );
        host
    }

    #[test]
    fn test_spawn_requires_registered_type() {
        let mut host = host();
        assert!(matches!(
            host.spawn("Ghost", "Phantom"),
            Err(Error::UnknownType(_))
        ));
        assert!(host.spawn("Bob", "Enemy").is_ok());
    }

    #[test]
    fn test_children_and_roots() {
        let mut host = host();
        let parent = host.spawn("Pack", "Enemy").unwrap();
        let a = host.spawn_child(parent, "A", "Enemy").unwrap();
        let b = host.spawn_child(parent, "B", "Enemy").unwrap();
        host.add_root(Category::Enemies, parent);

        assert_eq!(host.children_of(parent), vec![a, b]);
        assert_eq!(host.roots(Category::Enemies), vec![parent]);
        assert!(host.roots(Category::Items).is_empty());
        assert_eq!(host.find("B"), Some(b));
    }

    #[test]
    fn test_destroyed_entity_is_invalid() {
        let mut host = host();
        let id = host.spawn("Bob", "Enemy").unwrap();
        host.destroy(id);

        assert!(!host.is_valid(id));
        assert!(host.type_name(id).unwrap_err().is_invalid_entity());
        assert!(host.scene_entities().is_empty());
    }

    #[test]
    fn test_unset_member_reads_null() {
        let mut host = host();
        let id = host.spawn("Bob", "Enemy").unwrap();
        let members = host.list_members(id).unwrap();
        assert_eq!(host.read_member(id, &members[0]).unwrap(), Value::Null);
    }

    #[test]
    fn test_method_is_not_readable() {
        let mut host = host();
        let id = host.spawn("Bob", "Enemy").unwrap();
        let method = MemberDescriptor::method("Enemy", "Attack", &[], "void");
        host.attach_member(id, method.clone()).unwrap();

        assert_eq!(host.list_members(id).unwrap().len(), 2);
        assert!(matches!(
            host.read_member(id, &method),
            Err(Error::MemberNotReadable(_))
        ));
    }

    #[test]
    fn test_refresh_without_frames() {
        let mut host = host();
        assert_eq!(host.refresh(), SceneEvent::Unchanged);
    }
}
