//! Configuration schema types for Velo.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with defaults that start a working shell.

mod tray;
mod webview;
mod window;

use serde::{Deserialize, Serialize};

pub use tray::TrayConfig;
pub use webview::WebviewConfig;
pub use window::{SizeConfig, WindowConfig};

/// Log output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `velo=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "velo=info".into(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VeloConfig {
    pub window: WindowConfig,
    pub webview: WebviewConfig,
    pub tray: TrayConfig,
    pub logging: LoggingConfig,
}
