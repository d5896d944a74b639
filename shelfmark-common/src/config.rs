//! Configuration loading and root folder resolution
//!
//! # Settings sources priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`SHELFMARK_ROOT_FOLDER`, then `SHELFMARK_ROOT`)
//! 3. TOML configuration file (`config.toml` under the platform config dir)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Primary environment variable for the root folder
pub const ENV_ROOT_FOLDER: &str = "SHELFMARK_ROOT_FOLDER";
/// Short-form environment variable, lower priority than [`ENV_ROOT_FOLDER`]
pub const ENV_ROOT: &str = "SHELFMARK_ROOT";

/// Database file name inside the root folder
const DATABASE_FILE: &str = "shelfmark.db";

/// Bootstrap configuration loaded from the TOML file
///
/// These settings cannot change during runtime. The service must restart
/// to pick up changes to the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolve the root folder following the priority order documented at the
/// top of this module.
///
/// Never fails: a missing or malformed TOML file logs a warning and falls
/// through to the next source.
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variables
    if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var(ENV_ROOT) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    match load_toml_config() {
        Ok(config) => {
            if let Some(root_folder) = config.root_folder {
                return root_folder;
            }
        }
        Err(Error::Config(_)) => {
            // Missing config file is the common case, not worth a warning
        }
        Err(e) => {
            warn!("Ignoring unreadable config file: {}", e);
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Parse the platform TOML config file if one exists
pub fn load_toml_config() -> Result<TomlConfig> {
    let path = config_file_path()?;
    let toml_content = std::fs::read_to_string(&path)?;
    toml::from_str(&toml_content)
        .map_err(|e| Error::Config(format!("Invalid config file {:?}: {}", path, e)))
}

/// Locate the configuration file for the platform
fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/shelfmark/config.toml first, then /etc/shelfmark/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("shelfmark").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/shelfmark/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("shelfmark").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/shelfmark
        dirs::data_local_dir()
            .map(|d| d.join("shelfmark"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/shelfmark"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/shelfmark
        dirs::data_dir()
            .map(|d| d.join("shelfmark"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/shelfmark"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\shelfmark
        dirs::data_local_dir()
            .map(|d| d.join("shelfmark"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\shelfmark"))
    } else {
        PathBuf::from("./shelfmark_data")
    }
}

/// Create the root folder if it does not exist yet
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    if !root.exists() {
        std::fs::create_dir_all(root)?;
    }
    Ok(())
}

/// Path of the SQLite database file inside the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}
