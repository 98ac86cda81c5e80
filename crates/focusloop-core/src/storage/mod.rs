mod settings;

pub use settings::{DisplaySettings, Settings, TimerSettings};

use std::path::PathBuf;

/// Environment variable that overrides the settings directory.
pub const CONFIG_DIR_ENV: &str = "FOCUSLOOP_CONFIG_DIR";

/// Returns `$FOCUSLOOP_CONFIG_DIR` if set, else `<config dir>/focusloop/`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn config_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("focusloop"),
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
