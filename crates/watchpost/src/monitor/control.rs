//! Cross-thread control of a running [`Monitor`](super::Monitor).
//!
//! Input threads (a Ctrl+C handler, a keyboard reader) post requests here.
//! The polling loop drains them between cycles and sleeps on the same
//! condvar, so a new request or a stop cuts its wait short.

use std::mem;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Work the polling loop performs between cycles on behalf of another thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    /// Truncate and re-header every category log
    ClearLogs,
    /// Dump every rooted tree into the `Structure` log
    LogStructure,
}

/// Why [`MonitorControl::wait`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Requested,
    Stopped,
}

#[derive(Debug, Default)]
struct ControlState {
    stopped: bool,
    pending: Vec<ControlRequest>,
}

/// Stop flag plus a queue of between-cycle requests.
#[derive(Debug, Default)]
pub struct MonitorControl {
    state: Mutex<ControlState>,
    wake: Condvar,
}

impl MonitorControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to return after the cycle in progress
    pub fn stop(&self) {
        self.lock().stopped = true;
        self.wake.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Queue a request. A request already pending is not queued twice.
    pub fn request(&self, request: ControlRequest) {
        {
            let mut state = self.lock();
            if !state.pending.contains(&request) {
                state.pending.push(request);
            }
        }
        self.wake.notify_all();
    }

    /// Take every pending request in arrival order
    pub fn take_requests(&self) -> Vec<ControlRequest> {
        mem::take(&mut self.lock().pending)
    }

    /// Sleep for up to `timeout`, returning early on a stop or a new request
    pub fn wait(&self, timeout: Duration) -> Wake {
        let guard = self.lock();
        let (state, _) = self
            .wake
            .wait_timeout_while(guard, timeout, |s| !s.stopped && s.pending.is_empty())
            .unwrap_or_else(PoisonError::into_inner);

        if state.stopped {
            Wake::Stopped
        } else if !state.pending.is_empty() {
            Wake::Requested
        } else {
            Wake::Elapsed
        }
    }

    // Writers only set a flag or push, so a poisoned state is still consistent
    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
