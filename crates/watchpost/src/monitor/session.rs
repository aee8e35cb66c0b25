use crate::category::Category;
use crate::dedup::DedupTracker;
use crate::detect::KnownMembers;
use crate::snapshot::{SnapshotScope, SnapshotStore};

/// All mutable monitoring state for one game session.
///
/// Dropped and recreated when the host signals a level or scene change.
#[derive(Debug)]
pub struct MonitoringSession {
    pub(crate) snapshots: SnapshotStore,
    pub(crate) dedup: DedupTracker,
    pub(crate) known: KnownMembers,
}

impl MonitoringSession {
    pub fn new(scope: SnapshotScope) -> Self {
        Self {
            snapshots: SnapshotStore::new(scope),
            dedup: DedupTracker::new(),
            known: KnownMembers::new(),
        }
    }

    /// Drop snapshot, dedup and member state of one category
    pub fn clear(&mut self, category: Category) {
        self.snapshots.clear(category);
        self.dedup.clear(category);
        self.known.clear(category);
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn dedup(&self) -> &DedupTracker {
        &self.dedup
    }
}

impl Default for MonitoringSession {
    fn default() -> Self {
        Self::new(SnapshotScope::default())
    }
}
