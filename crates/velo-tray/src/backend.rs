//! Seam between the menu model and whatever draws it.

use velo_common::{IconImage, MenuItemId, PlatformError};

use crate::forest::MenuNode;

/// A native tray surface: one status icon plus its context menu.
///
/// The controller drives a backend strictly from its own model, so a backend
/// never has to validate ids or parents. Dropping the backend removes the
/// icon and frees the native menu.
pub trait TrayBackend {
    /// Register the status icon with the platform.
    fn create() -> Result<Self, PlatformError>
    where
        Self: Sized;

    fn set_icon(&mut self, icon: &IconImage) -> Result<(), PlatformError>;

    /// Let the platform tint the icon like its own menu bar glyphs. Only
    /// macOS has template images.
    fn set_icon_as_template(&mut self, _template: bool) {}

    fn set_tooltip(&mut self, text: &str);

    fn set_title(&mut self, text: &str);

    /// Append a labeled node as the last child of `parent`.
    fn append_item(&mut self, parent: MenuItemId, node: &MenuNode);

    fn append_separator(&mut self, parent: MenuItemId);

    /// Push the node's current label, check and enabled state to the
    /// native item.
    fn sync_item(&mut self, node: &MenuNode);

    /// Native hover text for one item. Not every platform has one.
    fn set_item_tooltip(&mut self, _node: &MenuNode) {}
}
