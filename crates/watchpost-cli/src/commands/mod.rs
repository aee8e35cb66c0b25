//! CLI command implementations.

pub mod clear;
pub mod dump;
pub mod run;

use anyhow::{Context, Result};
use watchpost::ScriptedHost;

use crate::SceneArgs;

/// Load the scene script named on the command line
pub fn load_scene(args: &SceneArgs) -> Result<ScriptedHost> {
    ScriptedHost::load(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn demo_scene() -> SceneArgs {
        SceneArgs {
            scene: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenes/demo.json"),
            log_dir: None,
        }
    }

    #[test]
    fn test_demo_scene_loads() {
        let host = load_scene(&demo_scene()).unwrap();
        assert!(host.find("Player").is_some());
        assert!(host.find("Ghoul").is_some());
        assert_eq!(host.frames_remaining(), 6);
    }

    #[test]
    fn test_missing_scene_names_path() {
        let args = SceneArgs {
            scene: PathBuf::from("no/such/scene.json"),
            log_dir: None,
        };
        let err = load_scene(&args).unwrap_err();
        assert!(err.to_string().contains("no/such/scene.json"));
    }
}
