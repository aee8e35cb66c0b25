//! JSON scene scripts for [`ScriptedHost`].
//!
//! ```json
//! {
//!   "types": [{ "name": "Stamina", "members": [
//!       { "name": "EnergyCurrent", "kind": "field", "type": "float" }] }],
//!   "entities": [{ "id": 1, "name": "Player", "type": "Stamina",
//!       "roots": ["player"], "values": { "EnergyCurrent": { "float": 42.0 } } }],
//!   "frames": [{ "set": [{ "entity": 1, "member": "EnergyCurrent",
//!       "value": { "float": 55.0 } }] }]
//! }
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use super::ScriptedHost;
use crate::category::Category;
use crate::error::Result;
use crate::introspect::{EntityId, MemberDescriptor, MemberKind, SceneEvent};
use crate::value::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneScript {
    #[serde(default)]
    pub types: Vec<TypeSpec>,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSpec {
    pub name: String,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberSpec {
    pub name: String,
    pub kind: MemberKind,
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default = "default_true")]
    pub readable: bool,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub parameters: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl MemberSpec {
    fn descriptor(&self, declaring_type: &str) -> MemberDescriptor {
        let is_method = self.kind == MemberKind::Method;
        MemberDescriptor {
            declaring_type: declaring_type.to_string(),
            name: self.name.clone(),
            kind: self.kind,
            value_type: self.value_type.clone(),
            readable: self.readable && !is_method,
            writable: self.writable && !is_method,
            parameters: self.parameters.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntitySpec {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub children: Vec<u64>,
    /// Categories this entity is a root of
    #[serde(default)]
    pub roots: Vec<Category>,
    #[serde(default)]
    pub values: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetValue {
    pub entity: u64,
    pub member: String,
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FailMember {
    pub entity: u64,
    pub member: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachMember {
    pub entity: u64,
    /// Declaring type of the attached behavior
    #[serde(rename = "type")]
    pub type_name: String,
    pub member: MemberSpec,
}

/// One scripted step, applied on a host refresh
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub spawn: Vec<EntitySpec>,
    #[serde(default)]
    pub set: Vec<SetValue>,
    #[serde(default)]
    pub fail: Vec<FailMember>,
    #[serde(default)]
    pub attach: Vec<AttachMember>,
    #[serde(default)]
    pub destroy: Vec<u64>,
    /// Signal a level / scene transition
    #[serde(default)]
    pub reset: bool,
}

impl SceneScript {
    pub fn into_host(self) -> Result<ScriptedHost> {
        let mut host = ScriptedHost::new();
        for ty in &self.types {
            let members = ty.members.iter().map(|m| m.descriptor(&ty.name)).collect();
            host.define_type(&ty.name, members);
        }
        for spec in &self.entities {
            spawn_entity(&mut host, spec)?;
        }
        // children may reference entities declared later
        for spec in &self.entities {
            for child in &spec.children {
                host.add_child(EntityId(spec.id), EntityId(*child))?;
            }
        }
        for frame in self.frames {
            host.push_frame(frame);
        }
        Ok(host)
    }
}

fn spawn_entity(host: &mut ScriptedHost, spec: &EntitySpec) -> Result<()> {
    let id = EntityId(spec.id);
    host.insert_entity(id, &spec.name, &spec.type_name)?;
    for (member, value) in &spec.values {
        host.set_value(id, member, value.clone())?;
    }
    for category in &spec.roots {
        host.add_root(*category, id);
    }
    Ok(())
}

impl Frame {
    /// Apply the frame. Steps referring to unknown entities are skipped.
    pub fn apply(self, host: &mut ScriptedHost) -> SceneEvent {
        for spec in &self.spawn {
            if let Err(e) = spawn_entity(host, spec) {
                warn!("Scripted spawn of {} skipped: {}", spec.name, e);
                continue;
            }
            for child in &spec.children {
                if let Err(e) = host.add_child(EntityId(spec.id), EntityId(*child)) {
                    warn!("Scripted child link skipped: {}", e);
                }
            }
        }
        for step in self.set {
            if let Err(e) = host.set_value(EntityId(step.entity), &step.member, step.value) {
                warn!("Scripted set of {} skipped: {}", step.member, e);
            }
        }
        for step in &self.fail {
            if let Err(e) = host.fail_member(EntityId(step.entity), &step.member, &step.message) {
                warn!("Scripted failure of {} skipped: {}", step.member, e);
            }
        }
        for step in &self.attach {
            let descriptor = step.member.descriptor(&step.type_name);
            if let Err(e) = host.attach_member(EntityId(step.entity), descriptor) {
                warn!("Scripted attach of {} skipped: {}", step.member.name, e);
            }
        }
        for id in &self.destroy {
            host.destroy(EntityId(*id));
        }

        if self.reset {
            SceneEvent::Reset
        } else {
            SceneEvent::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{SceneProvider, TypeIntrospector};

    const SCENE: &str = r#"{
        "types": [
            { "name": "Stamina", "members": [
                { "name": "EnergyCurrent", "kind": "field", "type": "float" },
                { "name": "Regen", "kind": "method", "type": "void", "parameters": ["float"] }
            ] },
            { "name": "Enemy", "members": [
                { "name": "Health", "kind": "property", "type": "int", "writable": true }
            ] }
        ],
        "entities": [
            { "id": 1, "name": "Player", "type": "Stamina", "roots": ["player"],
              "children": [2], "values": { "EnergyCurrent": { "float": 42.0 } } },
            { "id": 2, "name": "Shadow", "type": "Enemy", "values": { "Health": { "int": 10 } } }
        ],
        "frames": [
            { "set": [ { "entity": 1, "member": "EnergyCurrent", "value": { "float": 55.0 } } ] },
            { "destroy": [2], "reset": true }
        ]
    }"#;

    #[test]
    fn test_load_scene() {
        let host = ScriptedHost::from_json(SCENE).unwrap();
        assert_eq!(host.roots(Category::Player), vec![EntityId(1)]);
        assert_eq!(host.children_of(EntityId(1)), vec![EntityId(2)]);
        assert_eq!(host.frames_remaining(), 2);

        let members = host.list_members(EntityId(1)).unwrap();
        assert_eq!(members.len(), 2);
        assert!(!members[1].readable);
        assert_eq!(
            host.read_member(EntityId(1), &members[0]).unwrap(),
            Value::Float(42.0)
        );
    }

    #[test]
    fn test_frames_apply_in_order() {
        let mut host = ScriptedHost::from_json(SCENE).unwrap();
        let members = host.list_members(EntityId(1)).unwrap();

        assert_eq!(host.refresh(), SceneEvent::Unchanged);
        assert_eq!(
            host.read_member(EntityId(1), &members[0]).unwrap(),
            Value::Float(55.0)
        );

        assert_eq!(host.refresh(), SceneEvent::Reset);
        assert!(!host.is_valid(EntityId(2)));
        assert_eq!(host.frames_remaining(), 0);
    }

    #[test]
    fn test_frame_with_unknown_entity_is_tolerated() {
        let mut host = ScriptedHost::from_json(SCENE).unwrap();
        let frame: Frame = serde_json::from_str(
            r#"{ "set": [ { "entity": 99, "member": "Health", "value": { "int": 1 } } ] }"#,
        )
        .unwrap();
        assert_eq!(frame.apply(&mut host), SceneEvent::Unchanged);
    }

    #[test]
    fn test_unknown_type_fails_to_load() {
        let json = r#"{ "entities": [ { "id": 1, "name": "X", "type": "Missing" } ] }"#;
        assert!(ScriptedHost::from_json(json).is_err());
    }
}
