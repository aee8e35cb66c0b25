//! Config file loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use watchpost::MonitorConfig;

const CONFIG_FILE_NAME: &str = "watchpost.toml";

/// Default config location under the user config directory
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("watchpost").join(CONFIG_FILE_NAME))
}

/// Load the monitor config.
///
/// An explicit path that does not exist falls back to defaults with a
/// warning; a missing default file falls back silently.
pub fn load(explicit: Option<&Path>) -> Result<MonitorConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                warn!("Config {} not found, using defaults", path.display());
                return Ok(MonitorConfig::default());
            }
            path.to_path_buf()
        }
        None => match default_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No config file, using defaults");
                return Ok(MonitorConfig::default());
            }
        },
    };

    let config = read(&path)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

fn read(path: &Path) -> Result<MonitorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use watchpost::SnapshotScope;

    #[test]
    fn test_load_partial_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
log_dir = "/tmp/watchpost-logs"
poll_interval_ms = 2500
snapshot_scope = "per_entity"
"#,
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.log_dir, PathBuf::from("/tmp/watchpost-logs"));
        assert_eq!(config.poll_interval(), Duration::from_millis(2500));
        assert_eq!(config.snapshot_scope, SnapshotScope::PerEntity);
        // Unset keys keep their defaults
        assert_eq!(config.world_every, MonitorConfig::default().world_every);
    }

    #[test]
    fn test_missing_explicit_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.poll_interval_ms, MonitorConfig::default().poll_interval_ms);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();

        let err = load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }
}
