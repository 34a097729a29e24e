//! Velo configuration system.
//!
//! TOML-based configuration for the window, the web surface, the tray, and
//! logging. All sections use defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use velo_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::VeloConfig;
pub use toml_loader::{default_config_path, load_from_path, resolve_relative};

use velo_common::ConfigError;

/// Load config from the platform default path and validate it.
pub fn load_config() -> Result<VeloConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &VeloConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let config = VeloConfig::default();
        let json = config_to_json(&config);
        assert!(json.contains("\"window\""));
        assert!(json.contains("\"webview\""));
        assert!(json.contains("\"tray\""));
        assert!(json.contains("\"logging\""));
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let config = VeloConfig::default();
        let json = config_to_json(&config);
        let parsed: VeloConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.window.title, "Velo");
        assert_eq!(parsed.webview.scheme, "velo");
        assert_eq!(parsed.tray.menu.len(), config.tray.menu.len());
    }
}
