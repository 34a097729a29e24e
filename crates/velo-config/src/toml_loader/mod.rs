//! TOML config file loading and creation.


use crate::schema::VeloConfig;
use crate::validation;
use std::path::{Path, PathBuf};
use tracing::info;
use velo_common::ConfigError;

/// Load config from a specific TOML file path.
///
/// Missing fields take their serde defaults. A config that parses but fails
/// validation is returned as [`ConfigError::ValidationError`]; the caller
/// decides whether to fall back to the defaults.
pub fn load_from_path(path: &Path) -> Result<VeloConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
    })?;

    let config: VeloConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    validation::validate(&config)?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On macOS: `~/Library/Application Support/velo/config.toml`
/// On Linux: `~/.config/velo/config.toml`
/// On Windows: `%APPDATA%\velo\config.toml`
///
/// If the file does not exist, a commented default is written and the
/// defaults are returned.
pub fn load_default() -> Result<VeloConfig, ConfigError> {
    let path = default_config_path()?;

    if !path.exists() {
        info!("no config found at {}, creating default", path.display());
        create_default_config(&path)?;
        return Ok(VeloConfig::default());
    }

    load_from_path(&path)
}

/// Get the platform-specific default config file path.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        ConfigError::ParseError("could not determine config directory".into())
    })?;
    Ok(config_dir.join("velo").join("config.toml"))
}

/// Resolve a path from the config file: absolute paths pass through,
/// relative ones are taken relative to the config file's directory.
pub fn resolve_relative(config_path: &Path, value: &str) -> PathBuf {
    let candidate = Path::new(value);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) => dir.join(candidate),
        None => candidate.to_path_buf(),
    }
}

/// Create a default TOML config file with documentation comments.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, default_config_toml()).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!("created default config at {}", path.display());
    Ok(())
}

/// Default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Velo Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[window]
# title = "Velo"
# width = 1024            # 100-16384
# height = 768            # 100-16384
# min_size = { width = 480, height = 320 }
# max_size = { width = 3840, height = 2160 }
# always_on_top = false
# start_hidden = false
# icon = "icon.ico"       # relative to this file

[webview]
# url = "velo://localhost/index.html"
# scheme = "velo"         # loads under this scheme are served by the host
# devtools = false
# user_agent = "Velo/0.1"
# injected_script = "inject.js"
# assets = "assets"       # directory served under the scheme

[tray]
# enabled = true
# tooltip = "Velo"
# title = "Velo"          # macOS menu bar text
# icon = "tray.ico"
# icon_as_template = false  # macOS: tint the icon with the menu bar
#
# [[tray.menu]]
# id = 1
# label = "Show Window"
#
# [[tray.menu]]
# separator = true
#
# [[tray.menu]]
# id = 99
# label = "Quit"
# shortcut = "Ctrl+Q"

[logging]
# level = "velo=info"
"##
}
