pub mod error;
pub mod settings;

pub use error::*;
pub use settings::*;

use std::path::{Path, PathBuf};

/// Environment variable naming the config file directly
pub const CONFIG_ENV: &str = "ENVSWEEP_CONFIG";

/// envsweep config directory (`~/.config/envsweep`)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("envsweep"))
}

/// Find the settings file
///
/// Search order:
/// 1. `ENVSWEEP_CONFIG` (must exist when set)
/// 2. current directory: `envsweep.local.yaml`, `envsweep.yaml`
/// 3. `~/.config/envsweep/config.yaml`
///
/// Returns `None` when no file exists; defaults apply then.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Some(config_path) = std::env::var(CONFIG_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
    {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["envsweep.local.yaml", "envsweep.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Load settings from an explicit file
pub fn load_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings = Settings::from_yaml(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from the first file found, or the defaults
pub fn load() -> Result<(Settings, Option<PathBuf>)> {
    match find_config_file()? {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            let settings = load_from(&path)?;
            Ok((settings, Some(path)))
        }
        None => {
            tracing::debug!("No settings file found, using defaults");
            Ok((Settings::default(), None))
        }
    }
}
