//! Window configuration types.

use serde::{Deserialize, Serialize};

/// A width/height pair in logical pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SizeConfig {
    pub width: u32,
    pub height: u32,
}

/// Top-level window appearance and behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Static window title.
    pub title: String,
    /// Initial inner width (valid range: 100-16384).
    pub width: u32,
    /// Initial inner height (valid range: 100-16384).
    pub height: u32,
    pub min_size: Option<SizeConfig>,
    pub max_size: Option<SizeConfig>,
    pub always_on_top: bool,
    /// Create the window hidden; the host shows it later.
    pub start_hidden: bool,
    /// Path to the window icon (ICO/PNG). Relative paths resolve against
    /// the config directory.
    pub icon: Option<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Velo".into(),
            width: 1024,
            height: 768,
            min_size: None,
            max_size: None,
            always_on_top: false,
            start_hidden: false,
            icon: None,
        }
    }
}
