//! Monitor configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::introspect::{HeuristicSet, default_heuristics};
use crate::snapshot::SnapshotScope;

/// Configuration for the [`Monitor`](crate::Monitor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Directory holding one log file per category
    pub log_dir: PathBuf,
    /// Interval between polling cycles
    pub poll_interval_ms: u64,
    /// World objects are polled every N-th cycle
    pub world_every: u64,
    /// The full-scene sweep runs every N-th cycle
    pub misc_every: u64,
    pub max_walk_depth: usize,
    /// Prefix log lines with the local time
    pub timestamps: bool,
    pub snapshot_scope: SnapshotScope,
    /// Advisory member-name tags
    pub heuristics: Vec<HeuristicSet>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            poll_interval_ms: 10_000,
            world_every: 5,
            misc_every: 30,
            max_walk_depth: 64,
            timestamps: true,
            snapshot_scope: SnapshotScope::PerType,
            heuristics: default_heuristics(),
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration builder
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Builder for MonitorConfig
#[derive(Debug, Clone, Default)]
pub struct MonitorConfigBuilder {
    log_dir: Option<PathBuf>,
    poll_interval: Option<Duration>,
    world_every: Option<u64>,
    misc_every: Option<u64>,
    max_walk_depth: Option<usize>,
    timestamps: Option<bool>,
    snapshot_scope: Option<SnapshotScope>,
    heuristics: Option<Vec<HeuristicSet>>,
}

impl MonitorConfigBuilder {
    pub fn log_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.log_dir = Some(path.into());
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn world_every(mut self, cycles: u64) -> Self {
        self.world_every = Some(cycles);
        self
    }

    pub fn misc_every(mut self, cycles: u64) -> Self {
        self.misc_every = Some(cycles);
        self
    }

    pub fn max_walk_depth(mut self, depth: usize) -> Self {
        self.max_walk_depth = Some(depth);
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = Some(enabled);
        self
    }

    pub fn snapshot_scope(mut self, scope: SnapshotScope) -> Self {
        self.snapshot_scope = Some(scope);
        self
    }

    pub fn heuristics(mut self, sets: Vec<HeuristicSet>) -> Self {
        self.heuristics = Some(sets);
        self
    }

    /// Build the configuration
    pub fn build(self) -> MonitorConfig {
        let default = MonitorConfig::default();
        MonitorConfig {
            log_dir: self.log_dir.unwrap_or(default.log_dir),
            poll_interval_ms: self
                .poll_interval
                .map_or(default.poll_interval_ms, |d| d.as_millis() as u64),
            world_every: self.world_every.unwrap_or(default.world_every),
            misc_every: self.misc_every.unwrap_or(default.misc_every),
            max_walk_depth: self.max_walk_depth.unwrap_or(default.max_walk_depth),
            timestamps: self.timestamps.unwrap_or(default.timestamps),
            snapshot_scope: self.snapshot_scope.unwrap_or(default.snapshot_scope),
            heuristics: self.heuristics.unwrap_or(default.heuristics),
        }
    }
}
