//! Main polling mode.

use std::sync::Arc;

use anyhow::Result;
use owo_colors::OwoColorize;
use tracing::{info, warn};
use watchpost::{CycleReport, Monitor, MonitorConfig, MonitorControl, SnapshotScope};

use crate::RunArgs;
use crate::commands::load_scene;
use crate::input;

/// Run the polling loop over a scripted scene
pub fn run(mut config: MonitorConfig, args: &RunArgs) -> Result<()> {
    if let Some(dir) = &args.scene.log_dir {
        config.log_dir = dir.clone();
    }
    if let Some(ms) = args.interval_ms {
        config.poll_interval_ms = ms;
    }
    if args.per_entity {
        config.snapshot_scope = SnapshotScope::PerEntity;
    }

    let host = load_scene(&args.scene)?;

    // Setup graceful shutdown handler
    let control = Arc::new(MonitorControl::new());
    let control_ctrlc = Arc::clone(&control);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        control_ctrlc.stop();
    })?;

    // Keyboard: Esc/q quit, c clears logs, s dumps game structure
    let _keyboard_handle = input::spawn_keyboard_monitor(Arc::clone(&control));

    info!("watchpost {}", env!("CARGO_PKG_VERSION"));
    let mut monitor = Monitor::with_file_logs(host, config)?;
    monitor.set_enabled(true);

    println!("Monitoring... (Esc/q quit, c clear logs, s log structure)");
    let stats = monitor.run(&control, args.cycles, print_report);

    monitor.set_enabled(false);
    control.stop();

    println!(
        "{} cycles, {} dumps, {} changes, {} failures, {} resets",
        stats.cycles, stats.dumped, stats.changes, stats.failures, stats.resets
    );
    if monitor.sink_failures() > 0 {
        warn!("{} log writes failed", monitor.sink_failures());
    }
    info!("Shutdown complete");
    Ok(())
}

fn print_report(report: &CycleReport) {
    let line = format!(
        "cycle {:>4}: {} dumped, {} changes, {} failures",
        report.cycle, report.dumped, report.changes, report.failures
    );
    if report.reset {
        println!("{}", "session reset".magenta());
    }
    if report.failures > 0 {
        println!("{}", line.red());
    } else if report.changes > 0 {
        println!("{}", line.green());
    } else {
        println!("{}", line.dimmed());
    }
}
