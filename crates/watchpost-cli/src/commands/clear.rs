//! Log truncation without a scene.

use std::str::FromStr;

use anyhow::{Result, anyhow};
use watchpost::{Category, CategoryLogs, FileSink, MonitorConfig};

use crate::ClearArgs;

/// Truncate and re-header one category log, or all of them
pub fn run(mut config: MonitorConfig, args: &ClearArgs) -> Result<()> {
    if let Some(dir) = &args.log_dir {
        config.log_dir = dir.clone();
    }

    let sink = FileSink::new(&config.log_dir)?;
    let dir = sink.dir().to_path_buf();
    let mut logs = CategoryLogs::new(Box::new(sink), config.timestamps);

    match &args.category {
        Some(name) => {
            let category =
                Category::from_str(name).map_err(|_| anyhow!("Unknown category: {}", name))?;
            logs.reset_with_header(category, "Log cleared");
            println!("Cleared {} log in {}", category, dir.display());
        }
        None => {
            logs.reset_all("Log cleared");
            println!("Cleared all logs in {}", dir.display());
        }
    }

    if logs.failures() > 0 {
        return Err(anyhow!("{} log writes failed", logs.failures()));
    }
    Ok(())
}
