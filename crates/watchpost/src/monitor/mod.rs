//! The monitoring engine's public surface.
//!
//! [`Monitor`] owns the host, the session state and the category logs, and
//! drives the polling cycle:
//!
//! - every cycle: player, enemy and item roots
//! - every `world_every`-th cycle: world-object roots
//! - every `misc_every`-th cycle: full-scene sweep into `Miscellaneous`
//!
//! A node the host fails to describe is written to the `System` log and
//! skipped with its subtree. A task that panics inside a host collaborator is
//! logged the same way. Neither stops the remaining tasks or later cycles.
//!
//! ## Example
//!
//! ```ignore
//! use watchpost::{Monitor, MonitorConfig, MonitorControl, ScriptedHost};
//!
//! let host = ScriptedHost::load("scene.json")?;
//! let mut monitor = Monitor::with_file_logs(host, MonitorConfig::default())?;
//! monitor.set_enabled(true);
//! monitor.run(&MonitorControl::new(), Some(10), |report| println!("{:?}", report));
//! ```

mod control;
mod guard;
mod scheduler;
mod session;

use std::time::Instant;

use tracing::{debug, error, info};

use crate::category::Category;
use crate::config::MonitorConfig;
use crate::dump::render_dump;
use crate::error::{Error, Result};
use crate::introspect::{EntityId, Host, MemberTagger, SceneEvent, discover};
use crate::sink::{CategoryLogs, FileSink, LogSink};
use crate::walk::{GraphWalker, WalkSummary};

pub use control::{ControlRequest, MonitorControl, Wake};
pub use scheduler::{Schedule, Scheduler, Task};
pub use session::MonitoringSession;

/// Categories whose roots come from the scene provider
const ROOTED_CATEGORIES: [Category; 4] = [
    Category::Player,
    Category::Enemies,
    Category::Items,
    Category::WorldObjects,
];

/// Outcome of one polling cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub tasks: Vec<Task>,
    pub dumped: usize,
    pub changes: usize,
    /// Failed tasks plus nodes skipped after a host error
    pub failures: usize,
    /// The host signalled a session reset before this cycle
    pub reset: bool,
}

/// Totals since the monitor was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub cycles: u64,
    pub dumped: u64,
    pub changes: u64,
    pub failures: u64,
    pub resets: u64,
}

pub struct Monitor<H: Host> {
    host: H,
    config: MonitorConfig,
    tagger: MemberTagger,
    session: MonitoringSession,
    logs: CategoryLogs,
    scheduler: Scheduler,
    stats: MonitorStats,
}

impl<H: Host> Monitor<H> {
    /// Create a monitor writing to `sink` and start a new session: every
    /// category stream is truncated and re-headed. The scheduler starts
    /// disabled.
    pub fn new(host: H, config: MonitorConfig, sink: Box<dyn LogSink>) -> Self {
        let mut monitor = Self::attach(host, config, sink);
        monitor.logs.reset_all("Session started");
        monitor
    }

    /// Create a monitor that appends to the existing category streams
    /// without re-heading them
    pub fn attach(host: H, config: MonitorConfig, sink: Box<dyn LogSink>) -> Self {
        let logs = CategoryLogs::new(sink, config.timestamps);
        let schedule = Schedule {
            interval: config.poll_interval(),
            world_every: config.world_every,
            misc_every: config.misc_every,
        };

        Self {
            host,
            tagger: MemberTagger::new(&config.heuristics),
            session: MonitoringSession::new(config.snapshot_scope),
            logs,
            scheduler: Scheduler::new(schedule),
            stats: MonitorStats::default(),
            config,
        }
    }

    /// Start a session logging to one file per category under
    /// `config.log_dir`
    pub fn with_file_logs(host: H, config: MonitorConfig) -> Result<Self> {
        let sink = file_sink(&config)?;
        Ok(Self::new(host, config, sink))
    }

    /// Append to the log files under `config.log_dir`, keeping their history
    pub fn attach_file_logs(host: H, config: MonitorConfig) -> Result<Self> {
        let sink = file_sink(&config)?;
        Ok(Self::attach(host, config, sink))
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn session(&self) -> &MonitoringSession {
        &self.session
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Number of log writes that failed so far
    pub fn sink_failures(&self) -> u64 {
        self.logs.failures()
    }

    /// Start or stop the polling scheduler
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.scheduler.set_enabled(enabled) {
            let state = if enabled { "enabled" } else { "disabled" };
            info!("Monitoring {}", state);
            self.logs.write(Category::System, &format!("Monitoring {}", state));
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.scheduler.is_enabled()
    }

    /// Session-lifecycle signal: drop all state and re-header every log
    pub fn on_reset(&mut self) {
        info!("Session reset, dropping monitoring state");
        self.session = MonitoringSession::new(self.config.snapshot_scope);
        self.logs.reset_all("Session reset");
        self.stats.resets += 1;
    }

    /// Clear the logs and state of one category, or of all categories
    pub fn clear_logs(&mut self, category: Option<Category>) {
        match category {
            Some(category) => {
                debug!("Clearing {} log", category);
                self.session.clear(category);
                self.logs.reset_with_header(category, "Log cleared");
            }
            None => {
                debug!("Clearing all logs");
                self.session = MonitoringSession::new(self.config.snapshot_scope);
                self.logs.reset_all("Log cleared");
            }
        }
    }

    /// Full structural dump of one entity, outside the polling cycle.
    ///
    /// Does not touch dedup or snapshot state.
    pub fn log_full_dump(
        &mut self,
        category: Category,
        entity: EntityId,
        header: &str,
    ) -> Result<()> {
        let report = discover(&self.host, entity, &self.tagger)?;
        self.logs.write(category, &render_dump(&report, Some(header), 0));
        Ok(())
    }

    /// Dump every rooted tree into the `Structure` log.
    ///
    /// Returns the number of entities written. Nodes the host fails to
    /// describe are reported to `System` and left out.
    pub fn log_game_structure(&mut self, header: &str) -> usize {
        let host = &self.host;
        let mut walker = GraphWalker::new(
            host,
            &self.tagger,
            &mut self.session,
            &mut self.logs,
            self.config.max_walk_depth,
        );

        let mut written = 0;
        for category in ROOTED_CATEGORIES {
            for root in host.roots(category) {
                let title = format!("{}: {}", header, category);
                written += walker.dump_tree(Category::Structure, root, &title, |e| {
                    host.children_of(e)
                });
            }
        }
        written
    }

    /// Carry out a request posted through [`MonitorControl`]
    pub fn handle(&mut self, request: ControlRequest) {
        match request {
            ControlRequest::ClearLogs => self.clear_logs(None),
            ControlRequest::LogStructure => {
                let written = self.log_game_structure("Game structure");
                info!("Logged structure of {} entities", written);
            }
        }
    }

    /// Run one polling cycle now, whether or not the scheduler is enabled
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycle(Instant::now())
    }

    /// Host per-frame callback: runs a cycle when enabled and the interval
    /// has elapsed since the previous one
    pub fn tick(&mut self, now: Instant) -> Option<CycleReport> {
        if !self.scheduler.is_due(now) {
            return None;
        }
        Some(self.cycle(now))
    }

    /// Blocking polling loop built on [`tick`](Self::tick).
    ///
    /// Between cycles it carries out the requests pending on `control` and
    /// passes each cycle's report to `on_cycle`. Returns when `control` is
    /// stopped, the scheduler is disabled, or `limit` cycles have run. A stop
    /// is observed between cycles only.
    pub fn run<F>(
        &mut self,
        control: &MonitorControl,
        limit: Option<u64>,
        mut on_cycle: F,
    ) -> MonitorStats
    where
        F: FnMut(&CycleReport),
    {
        info!("Polling every {:?}", self.scheduler.schedule().interval);

        let mut ran = 0u64;
        while self.is_enabled() && !control.is_stopped() {
            for request in control.take_requests() {
                self.handle(request);
            }

            if let Some(report) = self.tick(Instant::now()) {
                on_cycle(&report);
                ran += 1;
                if limit.is_some_and(|l| ran >= l) {
                    break;
                }
            }

            if control.wait(self.scheduler.until_due(Instant::now())) == Wake::Stopped {
                break;
            }
        }

        info!("Polling stopped after {} cycles", ran);
        self.stats
    }

    fn cycle(&mut self, now: Instant) -> CycleReport {
        let reset = self.host.refresh() == SceneEvent::Reset;
        if reset {
            self.on_reset();
        }

        let cycle = self.scheduler.begin_cycle(now);
        let mut report = CycleReport {
            cycle,
            reset,
            ..Default::default()
        };

        for task in self.scheduler.schedule().tasks_for(cycle) {
            match self.run_task_guarded(task) {
                Ok(summary) => {
                    report.dumped += summary.dumped;
                    report.changes += summary.changes;
                    report.failures += summary.failed;
                }
                Err(e) => {
                    report.failures += 1;
                    error!("Cycle {}: {} task failed: {}", cycle, task, e);
                    self.logs.write(
                        Category::System,
                        &format!("[cycle {}] {} task failed: {}", cycle, task, e),
                    );
                }
            }
            report.tasks.push(task);
        }

        self.stats.cycles += 1;
        self.stats.dumped += report.dumped as u64;
        self.stats.changes += report.changes as u64;
        self.stats.failures += report.failures as u64;

        debug!(
            "Cycle {}: {} tasks, {} dumped, {} changes, {} failures",
            cycle,
            report.tasks.len(),
            report.dumped,
            report.changes,
            report.failures
        );
        report
    }

    fn run_task_guarded(&mut self, task: Task) -> Result<WalkSummary> {
        guard::catch_task(|| self.run_task(task)).map_err(Error::HostPanic)
    }

    fn run_task(&mut self, task: Task) -> WalkSummary {
        let host = &self.host;
        let category = task.category();
        let mut walker = GraphWalker::new(
            host,
            &self.tagger,
            &mut self.session,
            &mut self.logs,
            self.config.max_walk_depth,
        );

        if task == Task::SceneSweep {
            return walker.sweep(category, host.scene_entities());
        }

        let mut summary = WalkSummary::default();
        for root in host.roots(category) {
            summary.merge(walker.walk(category, root, |e| host.children_of(e)));
        }
        summary
    }
}

fn file_sink(config: &MonitorConfig) -> Result<Box<dyn LogSink>> {
    let sink = FileSink::new(&config.log_dir)?;
    info!("Writing category logs to {}", sink.dir().display());
    Ok(Box::new(sink))
}
