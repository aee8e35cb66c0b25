//! One-off structural dump.

use std::str::FromStr;

use anyhow::{Result, anyhow};
use watchpost::{Category, Monitor, MonitorConfig};

use crate::DumpArgs;
use crate::commands::load_scene;

/// Append a dump of one entity, or of every rooted tree, to the existing
/// category logs
pub fn run(mut config: MonitorConfig, args: &DumpArgs) -> Result<()> {
    if let Some(dir) = &args.scene.log_dir {
        config.log_dir = dir.clone();
    }
    let category = Category::from_str(&args.category)
        .map_err(|_| anyhow!("Unknown category: {}", args.category))?;

    let host = load_scene(&args.scene)?;
    let log_path = config.log_dir.join(category.log_file_name());
    let mut monitor = Monitor::attach_file_logs(host, config)?;

    match &args.entity {
        Some(name) => {
            let entity = monitor
                .host()
                .find(name)
                .ok_or_else(|| anyhow!("No live entity named {}", name))?;
            monitor.log_full_dump(category, entity, &args.header)?;
            println!("Dumped {} ({}) to {}", name, entity, log_path.display());
        }
        None => {
            let count = monitor.log_game_structure(&args.header);
            let structure = monitor
                .config()
                .log_dir
                .join(Category::Structure.log_file_name());
            println!("Dumped {} entities to {}", count, structure.display());
        }
    }
    Ok(())
}
