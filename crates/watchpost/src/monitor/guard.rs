//! Panic isolation for scheduled tasks.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use tracing::debug;

thread_local! {
    static IN_TASK: Cell<bool> = const { Cell::new(false) };
}

static TASK_HOOK: Once = Once::new();

/// Run `task`, turning a panic into `Err(message)`.
///
/// A panic raised inside `task` is reported through `tracing` instead of the
/// default stderr hook. Panics on other threads, or outside a task, still
/// reach the previously installed hook.
pub(crate) fn catch_task<T>(task: impl FnOnce() -> T) -> Result<T, String> {
    install_hook();
    let outer = IN_TASK.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(task));
    IN_TASK.with(|flag| flag.set(outer));
    result.map_err(|payload| panic_message(payload.as_ref()))
}

fn install_hook() {
    TASK_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_TASK.with(Cell::get) {
                debug!("Task panicked: {}", info);
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
