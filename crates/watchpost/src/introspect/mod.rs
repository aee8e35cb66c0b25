//! Host capability traits.
//!
//! The host's runtime type metadata is reached only through
//! [`TypeIntrospector`]; the scene graph only through [`SceneProvider`]. Entity
//! handles are plain identities validated lazily on every access.

mod discovery;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::category::Category;
use crate::error::Result;
use crate::value::Value;

pub use discovery::{
    DiscoveredMember, EntityReport, HeuristicSet, MemberTagger, MemberValue, default_heuristics,
    discover, discover_member,
};

/// Process-unique, non-owning handle to a host object
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, IntoStaticStr, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Property,
    Method,
}

/// Immutable description of a member on a runtime type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub declaring_type: String,
    pub name: String,
    pub kind: MemberKind,
    /// Declared value type; the return type for methods
    pub value_type: String,
    pub readable: bool,
    pub writable: bool,
    /// Parameter types, methods only
    pub parameters: Vec<String>,
}

impl MemberDescriptor {
    pub fn field(declaring_type: &str, name: &str, value_type: &str) -> Self {
        Self {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            kind: MemberKind::Field,
            value_type: value_type.to_string(),
            readable: true,
            writable: true,
            parameters: Vec::new(),
        }
    }

    pub fn property(declaring_type: &str, name: &str, value_type: &str, writable: bool) -> Self {
        Self {
            kind: MemberKind::Property,
            writable,
            ..Self::field(declaring_type, name, value_type)
        }
    }

    pub fn method(declaring_type: &str, name: &str, parameters: &[&str], returns: &str) -> Self {
        Self {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            kind: MemberKind::Method,
            value_type: returns.to_string(),
            readable: false,
            writable: false,
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Fields and properties carry values; methods do not
    pub fn is_data(&self) -> bool {
        self.kind != MemberKind::Method
    }

    pub fn key(&self) -> MemberKey {
        MemberKey {
            declaring_type: self.declaring_type.clone(),
            name: self.name.clone(),
            kind: self.kind,
        }
    }

    /// One-line signature, e.g. `float moveSpeed` or `void Jump(float)`
    pub fn signature(&self) -> String {
        match self.kind {
            MemberKind::Method => format!(
                "{} {}({})",
                self.value_type,
                self.name,
                self.parameters.join(", ")
            ),
            _ => format!("{} {}", self.value_type, self.name),
        }
    }
}

/// Identity of a member: (declaring type, name, kind)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    pub declaring_type: String,
    pub name: String,
    pub kind: MemberKind,
}

/// Runtime type metadata of the host.
///
/// Every call may observe an entity that the host destroyed since the last
/// call; implementations report that as [`Error::InvalidEntity`](crate::Error::InvalidEntity).
pub trait TypeIntrospector {
    /// Whether the handle still refers to a live object
    fn is_valid(&self, entity: EntityId) -> bool;

    /// Name of the entity's runtime type
    fn type_name(&self, entity: EntityId) -> Result<String>;

    /// Human-readable name of the entity (e.g. its scene object name)
    fn display_name(&self, entity: EntityId) -> Result<String>;

    /// All members of the entity's complete runtime type, public or not,
    /// including behaviors attached to this instance
    fn list_members(&self, entity: EntityId) -> Result<Vec<MemberDescriptor>>;

    /// Read the current value of a data member
    fn read_member(&self, entity: EntityId, member: &MemberDescriptor) -> Result<Value>;
}

/// What the host reported when asked to refresh its scene view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    Unchanged,
    /// Level or scene transition; all monitoring state must be dropped
    Reset,
}

/// Scene / object-graph provider
pub trait SceneProvider {
    /// Roots monitored for a category, in order
    fn roots(&self, category: Category) -> Vec<EntityId>;

    /// Ordered children of an entity
    fn children_of(&self, entity: EntityId) -> Vec<EntityId>;

    /// Every object in the scene, for the miscellaneous sweep
    fn scene_entities(&self) -> Vec<EntityId>;

    /// Called once at the top of every polling cycle
    fn refresh(&mut self) -> SceneEvent {
        SceneEvent::Unchanged
    }
}

/// A host exposing both type metadata and a scene graph
pub trait Host: TypeIntrospector + SceneProvider {}

impl<T: TypeIntrospector + SceneProvider> Host for T {}
