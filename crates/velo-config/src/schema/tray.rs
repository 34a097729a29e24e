//! Status icon and tray menu configuration.

use serde::{Deserialize, Serialize};
use velo_common::MenuEntry;

/// Tray icon settings and the initial menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    pub enabled: bool,
    pub tooltip: String,
    /// Text next to the icon (macOS menu bar only).
    pub title: Option<String>,
    /// Path to the tray icon (ICO/PNG).
    pub icon: Option<String>,
    /// Treat the icon as a macOS template image (tinted by the menu bar).
    pub icon_as_template: bool,
    /// Initial menu; entries without `id` are numbered automatically.
    pub menu: Vec<MenuEntry>,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tooltip: "Velo".into(),
            title: None,
            icon: None,
            icon_as_template: false,
            menu: vec![
                MenuEntry::item("Show Window").with_id(1),
                MenuEntry::item("Hide Window").with_id(2),
                MenuEntry::separator(),
                MenuEntry::item("Quit").with_id(99),
            ],
        }
    }
}
