//! Prelude module for convenient imports
//!
//! ```ignore
//! use watchpost::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Engine: `Monitor`, `MonitorConfig`, `MonitorControl`, `ControlRequest`
//! - Host traits: `TypeIntrospector`, `SceneProvider`, `Host`
//! - Data: `Category`, `EntityId`, `MemberDescriptor`, `Value`, `ChangeRecord`
//! - Error handling: `Error`, `Result`

pub use crate::monitor::{ControlRequest, Monitor, MonitorControl};
pub use crate::config::MonitorConfig;

pub use crate::introspect::{Host, SceneEvent, SceneProvider, TypeIntrospector};

pub use crate::category::Category;
pub use crate::detect::ChangeRecord;
pub use crate::introspect::{EntityId, MemberDescriptor, MemberKind};
pub use crate::value::Value;

pub use crate::error::{Error, Result};
