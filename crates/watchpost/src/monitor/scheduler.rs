//! Cycle cadence of the polling loop.

use std::time::{Duration, Instant};

use strum::{Display, IntoStaticStr};

use crate::category::Category;

/// A unit of work run inside a polling cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
pub enum Task {
    Player,
    Enemies,
    Items,
    WorldObjects,
    SceneSweep,
}

impl Task {
    /// Category the task writes to
    pub fn category(&self) -> Category {
        match self {
            Self::Player => Category::Player,
            Self::Enemies => Category::Enemies,
            Self::Items => Category::Items,
            Self::WorldObjects => Category::WorldObjects,
            Self::SceneSweep => Category::Miscellaneous,
        }
    }
}

/// Which tasks run on which cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub interval: Duration,
    pub world_every: u64,
    pub misc_every: u64,
}

impl Schedule {
    /// Tasks for a 1-based cycle number, in execution order
    pub fn tasks_for(&self, cycle: u64) -> Vec<Task> {
        let mut tasks = vec![Task::Player, Task::Enemies, Task::Items];
        if every(cycle, self.world_every) {
            tasks.push(Task::WorldObjects);
        }
        if every(cycle, self.misc_every) {
            tasks.push(Task::SceneSweep);
        }
        tasks
    }
}

fn every(cycle: u64, period: u64) -> bool {
    period > 0 && cycle % period == 0
}

/// Cooperative single-threaded cycle clock
#[derive(Debug)]
pub struct Scheduler {
    schedule: Schedule,
    enabled: bool,
    cycle: u64,
    last_run: Option<Instant>,
}

impl Scheduler {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            enabled: false,
            cycle: 0,
            last_run: None,
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Returns `true` if the state changed
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        if enabled && changed {
            // first cycle runs immediately after enabling
            self.last_run = None;
        }
        changed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of cycles started so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Whether an enabled scheduler should start a cycle at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.enabled
            && self
                .last_run
                .is_none_or(|last| now.saturating_duration_since(last) >= self.schedule.interval)
    }

    /// Time left until the next cycle is due; zero when it already is
    pub fn until_due(&self, now: Instant) -> Duration {
        self.last_run.map_or(Duration::ZERO, |last| {
            (last + self.schedule.interval).saturating_duration_since(now)
        })
    }

    /// Start the next cycle, returning its 1-based number
    pub fn begin_cycle(&mut self, now: Instant) -> u64 {
        self.cycle += 1;
        self.last_run = Some(now);
        self.cycle
    }
}
