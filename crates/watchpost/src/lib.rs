//! # watchpost
//!
//! Runtime object-introspection and change-detection engine for live host
//! objects.
//!
//! This crate provides:
//! - A type-erased [`Value`] union with a canonical formatter and a
//!   type-aware approximate equality oracle
//! - Member discovery through the [`TypeIntrospector`] capability trait
//! - Per-category snapshot and dedup state ([`MonitoringSession`])
//! - A depth-first graph walker that dumps each entity once and diffs it on
//!   every visit
//! - A cooperative polling [`Monitor`] writing one append-only log per
//!   [`Category`]
//!
//! The host (scene graph, object lifetime, type metadata) is supplied by the
//! embedder through [`TypeIntrospector`] and [`SceneProvider`].
//! [`ScriptedHost`] is a descriptor-table implementation used for tests and
//! scripted replays.

pub mod category;
pub mod config;
pub mod dedup;
pub mod detect;
pub mod dump;
pub mod error;
pub mod host;
pub mod introspect;
pub mod monitor;
pub mod prelude;
pub mod sink;
pub mod snapshot;
pub mod value;
pub mod walk;

pub use category::Category;
pub use config::{MonitorConfig, MonitorConfigBuilder};
pub use dedup::DedupTracker;
pub use detect::{ChangeDetector, ChangeRecord, Detection, KnownMembers};
pub use error::{Error, Result};
pub use host::{Frame, SceneScript, ScriptedHost};
pub use introspect::{
    DiscoveredMember, EntityId, EntityReport, HeuristicSet, Host, MemberDescriptor, MemberKind,
    MemberTagger, MemberValue, SceneEvent, SceneProvider, TypeIntrospector, discover,
};
pub use monitor::{
    ControlRequest, CycleReport, Monitor, MonitorControl, MonitorStats, MonitoringSession,
    Schedule, Scheduler, Task, Wake,
};
pub use sink::{CategoryLogs, FileSink, LogSink, MemorySink};
pub use snapshot::{SnapshotScope, SnapshotStore};
pub use value::{EntityRef, Value, approx_equal, format_value};
pub use walk::{GraphWalker, WalkSummary};
