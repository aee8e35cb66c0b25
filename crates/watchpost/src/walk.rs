//! Depth-first walk over an entity tree.
//!
//! Each node gets a full structural dump the first time its identity is seen
//! in the category, and a change-detection pass on every visit. Nodes the host
//! destroyed are skipped together with their subtree. Any other host error
//! on a node is written to the `System` log and skips that subtree only; the
//! walk carries on with the node's siblings.

use tracing::{debug, warn};

use crate::category::Category;
use crate::detect::ChangeDetector;
use crate::dump::{render_detection, render_dump};
use crate::error::{Error, Result};
use crate::introspect::{EntityId, MemberTagger, TypeIntrospector, discover};
use crate::monitor::MonitoringSession;
use crate::sink::CategoryLogs;

/// Counters for one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub visited: usize,
    pub dumped: usize,
    pub changes: usize,
    /// Nodes found invalid and skipped with their subtree
    pub skipped: usize,
    /// Nodes whose host calls failed, logged and skipped with their subtree
    pub failed: usize,
}

impl WalkSummary {
    pub fn merge(&mut self, other: WalkSummary) {
        self.visited += other.visited;
        self.dumped += other.dumped;
        self.changes += other.changes;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

pub struct GraphWalker<'a, H: TypeIntrospector + ?Sized> {
    host: &'a H,
    tagger: &'a MemberTagger,
    session: &'a mut MonitoringSession,
    logs: &'a mut CategoryLogs,
    max_depth: usize,
}

impl<'a, H: TypeIntrospector + ?Sized> GraphWalker<'a, H> {
    pub fn new(
        host: &'a H,
        tagger: &'a MemberTagger,
        session: &'a mut MonitoringSession,
        logs: &'a mut CategoryLogs,
        max_depth: usize,
    ) -> Self {
        Self {
            host,
            tagger,
            session,
            logs,
            max_depth,
        }
    }

    /// Visit `root` and then its descendants, depth-first in child order.
    ///
    /// The relation is assumed acyclic; `max_depth` only guards against
    /// malformed graphs.
    pub fn walk<F>(&mut self, category: Category, root: EntityId, children_of: F) -> WalkSummary
    where
        F: Fn(EntityId) -> Vec<EntityId>,
    {
        let mut summary = WalkSummary::default();
        self.visit(category, root, 0, &children_of, &mut summary);
        summary
    }

    /// Visit a single entity without descending
    pub fn visit_single(&mut self, category: Category, entity: EntityId) -> WalkSummary {
        self.walk(category, entity, |_| Vec::new())
    }

    /// Visit a flat list of entities, skipping those another category
    /// already dumped
    pub fn sweep<I>(&mut self, category: Category, entities: I) -> WalkSummary
    where
        I: IntoIterator<Item = EntityId>,
    {
        let mut summary = WalkSummary::default();
        for entity in entities {
            if self.session.dedup.dumped_outside(entity, category) {
                continue;
            }
            summary.merge(self.visit_single(category, entity));
        }
        summary
    }

    fn visit<F>(
        &mut self,
        category: Category,
        entity: EntityId,
        depth: usize,
        children_of: &F,
        summary: &mut WalkSummary,
    ) where
        F: Fn(EntityId) -> Vec<EntityId>,
    {
        if depth > self.max_depth {
            debug!("{} walk stopped at depth {} ({})", category, depth, entity);
            return;
        }

        match self.visit_node(category, entity, depth, summary) {
            Ok(()) => {}
            Err(e) if e.is_invalid_entity() => {
                summary.skipped += 1;
                return;
            }
            Err(e) => {
                summary.failed += 1;
                self.report_failure(category, entity, &e);
                return;
            }
        }

        for child in children_of(entity) {
            self.visit(category, child, depth + 1, children_of, summary);
        }
    }

    fn report_failure(&mut self, category: Category, entity: EntityId, error: &Error) {
        let message = format!("{} walk skipped {}: {}", category, entity, error);
        warn!("{}", message);
        self.logs.write(Category::System, &message);
    }

    fn visit_node(
        &mut self,
        category: Category,
        entity: EntityId,
        depth: usize,
        summary: &mut WalkSummary,
    ) -> Result<()> {
        if !self.session.dedup.already_dumped(category, entity) {
            let report = discover(self.host, entity, self.tagger)?;
            self.logs.write(category, &render_dump(&report, None, depth));
            self.session.dedup.mark_dumped(category, entity);
            summary.dumped += 1;
        }

        let detector = ChangeDetector::new(self.host, self.tagger);
        let detection = detector.detect(
            category,
            entity,
            &mut self.session.snapshots,
            &mut self.session.known,
        )?;
        summary.visited += 1;
        summary.changes += detection.changes.len();
        self.logs.write_lines(category, render_detection(&detection));
        Ok(())
    }

    /// Dump a whole tree regardless of dedup state, without change detection.
    ///
    /// Returns the number of nodes written.
    pub fn dump_tree<F>(
        &mut self,
        category: Category,
        root: EntityId,
        header: &str,
        children_of: F,
    ) -> usize
    where
        F: Fn(EntityId) -> Vec<EntityId>,
    {
        self.logs.write(category, &format!("=== {} ===", header));
        let mut written = 0;
        let mut stack = vec![(root, 0usize)];
        while let Some((entity, depth)) = stack.pop() {
            if depth > self.max_depth {
                continue;
            }
            let report = match discover(self.host, entity, self.tagger) {
                Ok(r) => r,
                Err(e) if e.is_invalid_entity() => continue,
                Err(e) => {
                    self.report_failure(category, entity, &e);
                    continue;
                }
            };
            self.logs.write(category, &render_dump(&report, None, depth));
            written += 1;
            // reversed so the first child is written first
            for child in children_of(entity).into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ScriptedHost;
    use crate::introspect::{MemberDescriptor, SceneProvider};
    use crate::sink::MemorySink;
    use crate::snapshot::SnapshotScope;
    use crate::value::Value;

    struct Fixture {
        host: ScriptedHost,
        tagger: MemberTagger,
        session: MonitoringSession,
        logs: CategoryLogs,
        sink: MemorySink,
        root: EntityId,
        children: Vec<EntityId>,
    }

    impl Fixture {
        /// Root "Pack" with children A, B (B has grandchild C)
        fn new() -> Self {
            let mut host = ScriptedHost::new();
            host.define_type(
                "Enemy",
                vec![MemberDescriptor::field("Enemy", "Health", "int")],
            );
            let root = host.spawn("Pack", "Enemy").unwrap();
            let a = host.spawn_child(root, "A", "Enemy").unwrap();
            let b = host.spawn_child(root, "B", "Enemy").unwrap();
            let c = host.spawn_child(b, "C", "Enemy").unwrap();
            for id in [root, a, b, c] {
                host.set_value(id, "Health", Value::Int(100)).unwrap();
            }
            let sink = MemorySink::new();
            Self {
                host,
                tagger: MemberTagger::default(),
                session: MonitoringSession::new(SnapshotScope::PerEntity),
                logs: CategoryLogs::new(Box::new(sink.clone()), false),
                sink,
                root,
                children: vec![a, b, c],
            }
        }

        fn walk(&mut self) -> WalkSummary {
            let host = &self.host;
            let mut walker = GraphWalker::new(
                host,
                &self.tagger,
                &mut self.session,
                &mut self.logs,
                16,
            );
            walker.walk(Category::Enemies, self.root, |e| host.children_of(e))
        }

        fn dump_count(&self) -> usize {
            self.sink.count_matching(Category::Enemies, "[Enemy]")
        }
    }

    #[test]
    fn test_walk_visits_depth_first_and_dumps_each_node() {
        let mut fx = Fixture::new();
        let summary = fx.walk();
        assert_eq!(summary.visited, 4);
        assert_eq!(summary.dumped, 4);

        let headers: Vec<String> = fx
            .sink
            .lines(Category::Enemies)
            .into_iter()
            .filter(|l| l.contains("[Enemy]"))
            .collect();
        assert!(headers[0].contains("Pack"));
        assert!(headers[1].contains("A"));
        assert!(headers[2].contains("B"));
        assert!(headers[3].starts_with("    [Enemy] C"));
    }

    #[test]
    fn test_full_dump_at_most_once() {
        let mut fx = Fixture::new();
        fx.walk();
        fx.walk();
        let summary = fx.walk();
        assert_eq!(summary.dumped, 0);
        assert_eq!(summary.visited, 4);
        assert_eq!(fx.dump_count(), 4);
    }

    #[test]
    fn test_changes_are_logged_on_later_walks() {
        let mut fx = Fixture::new();
        fx.walk();
        fx.host
            .set_value(fx.children[2], "Health", Value::Int(40))
            .unwrap();

        let summary = fx.walk();
        assert_eq!(summary.changes, 1);
        assert_eq!(
            fx.sink
                .count_matching(Category::Enemies, "CHANGE C.Health: 100 -> 40"),
            1
        );
    }

    #[test]
    fn test_invalid_child_is_skipped_with_subtree() {
        let mut fx = Fixture::new();
        // B is destroyed; its child C is only reachable through B
        fx.host.destroy(fx.children[1]);

        let summary = fx.walk();
        assert_eq!(summary.visited, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(fx.dump_count(), 2);
    }

    #[test]
    fn test_walk_continues_past_destroyed_first_child() {
        let mut fx = Fixture::new();
        fx.host.destroy(fx.children[0]);

        let summary = fx.walk();
        assert_eq!(summary.visited, 3);
        assert_eq!(summary.dumped, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(fx.sink.count_matching(Category::Enemies, "[Enemy] A"), 0);
        assert_eq!(fx.sink.count_matching(Category::Enemies, "[Enemy] C"), 1);
    }

    /// Scripted host that cannot list the members of one entity
    struct UnlistedHost {
        inner: ScriptedHost,
        broken: EntityId,
    }

    impl TypeIntrospector for UnlistedHost {
        fn is_valid(&self, entity: EntityId) -> bool {
            self.inner.is_valid(entity)
        }
        fn type_name(&self, entity: EntityId) -> Result<String> {
            self.inner.type_name(entity)
        }
        fn display_name(&self, entity: EntityId) -> Result<String> {
            self.inner.display_name(entity)
        }
        fn list_members(&self, entity: EntityId) -> Result<Vec<MemberDescriptor>> {
            if entity == self.broken {
                return Err(Error::UnknownType("Ghost".to_string()));
            }
            self.inner.list_members(entity)
        }
        fn read_member(&self, entity: EntityId, member: &MemberDescriptor) -> Result<Value> {
            self.inner.read_member(entity, member)
        }
    }

    #[test]
    fn test_host_error_skips_only_that_subtree() {
        let Fixture {
            host,
            tagger,
            mut session,
            mut logs,
            sink,
            root,
            children,
        } = Fixture::new();
        let host = UnlistedHost {
            inner: host,
            broken: children[0],
        };

        let mut walker = GraphWalker::new(&host, &tagger, &mut session, &mut logs, 16);
        let summary = walker.walk(Category::Enemies, root, |e| host.inner.children_of(e));
        assert_eq!(summary.visited, 3);
        assert_eq!(summary.dumped, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(
            sink.count_matching(Category::System, "Enemies walk skipped #2: Unknown type: Ghost"),
            1
        );
        assert_eq!(sink.count_matching(Category::Enemies, "[Enemy] C"), 1);
    }

    #[test]
    fn test_dump_tree_skips_failing_node() {
        let Fixture {
            host,
            tagger,
            mut session,
            mut logs,
            sink,
            root,
            children,
        } = Fixture::new();
        let host = UnlistedHost {
            inner: host,
            broken: children[1],
        };

        let mut walker = GraphWalker::new(&host, &tagger, &mut session, &mut logs, 16);
        let written = walker.dump_tree(Category::Structure, root, "Structure", |e| {
            host.inner.children_of(e)
        });
        // B fails and C is only reachable through B
        assert_eq!(written, 2);
        assert_eq!(sink.count_matching(Category::System, "Structure walk skipped #3"), 1);
    }

    #[test]
    fn test_clear_makes_entities_eligible_again() {
        let mut fx = Fixture::new();
        fx.walk();
        fx.session.clear(Category::Enemies);
        let summary = fx.walk();
        assert_eq!(summary.dumped, 4);
        assert_eq!(summary.changes, 0);
    }

    #[test]
    fn test_sweep_skips_entities_owned_elsewhere() {
        let mut fx = Fixture::new();
        fx.walk();
        let loose = fx.host.spawn("Crate", "Enemy").unwrap();

        let host = &fx.host;
        let mut walker =
            GraphWalker::new(host, &fx.tagger, &mut fx.session, &mut fx.logs, 16);
        let summary = walker.sweep(Category::Miscellaneous, host.scene_entities());
        assert_eq!(summary.visited, 1);
        assert_eq!(summary.dumped, 1);
        assert_eq!(
            fx.sink.count_matching(Category::Miscellaneous, "[Enemy] Crate"),
            1
        );
        assert!(fx.session.dedup().already_dumped(Category::Miscellaneous, loose));
    }

    #[test]
    fn test_depth_guard() {
        let mut fx = Fixture::new();
        let host = &fx.host;
        let mut walker =
            GraphWalker::new(host, &fx.tagger, &mut fx.session, &mut fx.logs, 0);
        let summary = walker.walk(Category::Enemies, fx.root, |e| host.children_of(e));
        assert_eq!(summary.visited, 1);
    }

    #[test]
    fn test_dump_tree_ignores_dedup() {
        let mut fx = Fixture::new();
        fx.walk();
        let host = &fx.host;
        let mut walker =
            GraphWalker::new(host, &fx.tagger, &mut fx.session, &mut fx.logs, 16);
        let written = walker.dump_tree(Category::Structure, fx.root, "Structure", |e| {
            host.children_of(e)
        });
        assert_eq!(written, 4);

        let lines = fx.sink.lines(Category::Structure);
        assert_eq!(lines[0], "=== Structure ===");
        assert!(lines[1].starts_with("[Enemy] Pack"));
        assert!(lines.iter().any(|l| l.starts_with("    [Enemy] C")));
    }
}
