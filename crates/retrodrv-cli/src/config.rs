use log::{info, warn};
use retrodrv_core::DriverSettings;
use std::path::{Path, PathBuf};

use crate::backends;

const CONFIG_DIR: &str = "retrodrv";
const CONFIG_FILE: &str = "drivers.toml";

/// Per-user config directory: `%APPDATA%` on Windows, else the XDG base
/// directory with `~/.config` as its fallback.
fn user_config_dir() -> Option<PathBuf> {
    let appdata = cfg!(target_os = "windows")
        .then(|| std::env::var_os("APPDATA"))
        .flatten()
        .map(PathBuf::from);
    appdata
        .or_else(|| std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from))
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Driver config location, or the working directory when no per-user
/// directory is known.
pub fn default_config_path() -> PathBuf {
    match user_config_dir() {
        Some(dir) => dir.join(CONFIG_DIR).join(CONFIG_FILE),
        None => PathBuf::from(CONFIG_FILE),
    }
}

/// Loads driver settings, falling back to the built-in backends when the
/// file is missing or unreadable.
///
/// Keys missing from an existing file keep the library defaults, which
/// select no backend ("null") for that category.
pub fn load_from_file(path: &Path) -> DriverSettings {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return backends::default_settings(),
    };

    match toml::from_str::<DriverSettings>(&text) {
        Ok(settings) => {
            info!("Loaded driver config from {}", path.display());
            settings
        }
        Err(e) => {
            warn!(
                "Failed to parse driver config {}: {e}; using defaults",
                path.display()
            );
            backends::default_settings()
        }
    }
}

pub fn save_to_file(path: &Path, settings: &DriverSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let text = toml::to_string_pretty(settings).map_err(std::io::Error::other)?;
    std::fs::write(path, text)
}
