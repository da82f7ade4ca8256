// Called on startup and quit; keeps timing and live parameters between runs
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::pipeline::settings::Settings;

const STEPGRID_DIR: &str = ".stepgrid";
const SETTINGS_FILE: &str = "settings.json";

// <project_dir>/.stepgrid/settings.json
pub fn settings_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(STEPGRID_DIR).join(SETTINGS_FILE)
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings(project_dir: &Path) -> Settings {
    let path = settings_file_path(project_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) => {
            debug!(path = %path.display(), "no settings loaded: {e}");
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&data) {
        Ok(settings) => {
            info!(path = %path.display(), "settings loaded");
            settings.sanitized()
        }
        Err(e) => {
            warn!(path = %path.display(), "ignoring malformed settings: {e}");
            Settings::default()
        }
    }
}

// Save settings, making the directory if it doesn't exist already
pub fn save_settings(project_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let path = settings_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "settings saved");
    Ok(())
}
