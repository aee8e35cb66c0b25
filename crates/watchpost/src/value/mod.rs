//! Type-erased runtime values read from host entities.
//!
//! Every member read through a [`TypeIntrospector`](crate::introspect::TypeIntrospector)
//! is lowered into a [`Value`]. The formatter ([`format_value`]) and the
//! equality oracle ([`approx_equal`]) are exhaustive matches over this union.

mod equality;
mod format;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::introspect::EntityId;

pub use equality::{FLOAT_EPSILON, ROTATION_EPSILON_DEG, VECTOR_EPSILON, approx_equal};
pub use format::{MAX_INLINE_ITEMS, NULL_LITERAL, PREVIEW_ITEMS, format_value};

/// A value of unknown static type observed on a host entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
    Vec4([f64; 4]),
    /// Rotation as (x, y, z, w)
    Quat([f64; 4]),
    /// Color as (r, g, b, a)
    Color([f64; 4]),
    Seq(Vec<Value>),
    /// Key-value maps are only ever observed by their entry count
    Map { len: usize },
    Entity(EntityRef),
    /// Anything the host could not lower further, in its own string form
    Opaque(String),
}

/// Reference to another host entity held by a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub type_name: String,
    /// Display name of the entity owning the referenced object
    pub owner: String,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Containers are rendered by their default string form when nested
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Seq(_) | Value::Map { .. })
    }
}

/// Default string form of a value.
///
/// Containers never recurse here: a sequence renders as `List[n]` and a map as
/// `Map[n]`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(NULL_LITERAL),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::Vec2([x, y]) => write!(f, "({}, {})", x, y),
            Value::Vec3([x, y, z]) => write!(f, "({}, {}, {})", x, y, z),
            Value::Vec4([x, y, z, w]) | Value::Quat([x, y, z, w]) => {
                write!(f, "({}, {}, {}, {})", x, y, z, w)
            }
            Value::Color([r, g, b, a]) => write!(f, "RGBA({}, {}, {}, {})", r, g, b, a),
            Value::Seq(items) => write!(f, "List[{}]", items.len()),
            Value::Map { len } => write!(f, "Map[{}]", len),
            Value::Entity(r) => write!(f, "{} {}", r.type_name, r.id),
            Value::Opaque(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
