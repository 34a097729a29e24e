use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned identifier of a tray menu node.
///
/// `0` is reserved for the root menu and is never handed out for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuItemId(pub u32);

impl MenuItemId {
    pub const ROOT: MenuItemId = MenuItemId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl From<u32> for MenuItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a declarative menu description (config file or host code).
///
/// Entries without an `id` get one assigned when the template is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuEntry {
    pub id: Option<MenuItemId>,
    pub label: String,
    pub shortcut: String,
    pub tooltip: String,
    pub disabled: bool,
    pub checked: bool,
    pub separator: bool,
    pub submenu: Option<Vec<MenuEntry>>,
}

impl MenuEntry {
    pub fn item(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn separator() -> Self {
        Self {
            separator: true,
            ..Default::default()
        }
    }

    pub fn submenu(label: impl Into<String>, children: Vec<MenuEntry>) -> Self {
        Self {
            label: label.into(),
            submenu: Some(children),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(MenuItemId(id));
        self
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = shortcut.into();
        self
    }
}

/// Mouse button that clicked the status icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

impl WindowPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
