//! Tracks which entity identities already received a full structural dump.

use std::collections::{HashMap, HashSet};

use crate::category::Category;
use crate::introspect::EntityId;

#[derive(Debug, Default)]
pub struct DedupTracker {
    dumped: HashMap<Category, HashSet<EntityId>>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn already_dumped(&self, category: Category, entity: EntityId) -> bool {
        self.dumped
            .get(&category)
            .is_some_and(|set| set.contains(&entity))
    }

    /// Returns `true` if the entity was not marked before
    pub fn mark_dumped(&mut self, category: Category, entity: EntityId) -> bool {
        self.dumped.entry(category).or_default().insert(entity)
    }

    /// Whether any category other than `category` already dumped the entity
    pub fn dumped_outside(&self, entity: EntityId, category: Category) -> bool {
        self.dumped
            .iter()
            .any(|(c, set)| *c != category && set.contains(&entity))
    }

    pub fn clear(&mut self, category: Category) {
        self.dumped.remove(&category);
    }

    pub fn count(&self, category: Category) -> usize {
        self.dumped.get(&category).map_or(0, HashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_once_per_category() {
        let mut tracker = DedupTracker::new();
        assert!(!tracker.already_dumped(Category::Player, EntityId(1)));
        assert!(tracker.mark_dumped(Category::Player, EntityId(1)));
        assert!(!tracker.mark_dumped(Category::Player, EntityId(1)));
        assert!(tracker.already_dumped(Category::Player, EntityId(1)));

        // same identity may still be dumped once in another category
        assert!(!tracker.already_dumped(Category::Items, EntityId(1)));
    }

    #[test]
    fn test_global_view() {
        let mut tracker = DedupTracker::new();
        tracker.mark_dumped(Category::Enemies, EntityId(5));
        assert!(tracker.dumped_outside(EntityId(5), Category::Miscellaneous));
        assert!(!tracker.dumped_outside(EntityId(6), Category::Miscellaneous));
        assert!(!tracker.dumped_outside(EntityId(5), Category::Enemies));

        tracker.clear(Category::Enemies);
        assert!(!tracker.dumped_outside(EntityId(5), Category::Miscellaneous));
    }

    #[test]
    fn test_clear_is_scoped() {
        let mut tracker = DedupTracker::new();
        tracker.mark_dumped(Category::Player, EntityId(1));
        tracker.mark_dumped(Category::Items, EntityId(2));
        tracker.clear(Category::Player);

        assert_eq!(tracker.count(Category::Player), 0);
        assert_eq!(tracker.count(Category::Items), 1);
    }
}
