//! The tray controller: menu model, appearance, and native projection.
//!
//! All edits land in the [`MenuForest`] first and are then pushed to the
//! backend, if one exists. Invalid references and decode failures are
//! swallowed here and logged; callers get no error channel.

use tracing::{debug, info, warn};
use velo_common::{decode_icon, IconImage, MenuItemId, PlatformError};

use crate::backend::TrayBackend;
use crate::events::TrayEvent;
use crate::forest::{MenuForest, MenuNode, MenuSlot, NodeKind};
use crate::native::NativeTray;
use crate::quit::QuitHandle;
use crate::text::truncate_tooltip;

pub struct TrayController<B: TrayBackend = NativeTray> {
    forest: Option<MenuForest>,
    icon: Option<IconImage>,
    icon_as_template: bool,
    tooltip: Option<String>,
    title: Option<String>,
    backend: Option<B>,
    /// `initialize` ran before the event loop; create the native icon once
    /// the loop reports it has started.
    native_pending: bool,
    loop_started: bool,
    quit: QuitHandle,
}

impl<B: TrayBackend> Default for TrayController<B> {
    fn default() -> Self {
        Self {
            forest: None,
            icon: None,
            icon_as_template: false,
            tooltip: None,
            title: None,
            backend: None,
            native_pending: false,
            loop_started: false,
            quit: QuitHandle::new(),
        }
    }
}

impl TrayController<NativeTray> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B: TrayBackend> TrayController<B> {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create the empty root menu and register the status icon.
    ///
    /// Some platforms only allow the icon once the event loop is running;
    /// until then the model is live and the native side is built from it on
    /// [`on_event_loop_started`](Self::on_event_loop_started). A second call
    /// is a no-op.
    pub fn initialize(&mut self) {
        if self.forest.is_some() {
            debug!("tray already initialized");
            return;
        }
        self.forest = Some(MenuForest::new());
        if self.loop_started {
            self.realize(B::create);
        } else {
            debug!("tray icon deferred until the event loop starts");
            self.native_pending = true;
        }
    }

    /// Initialize with an explicit backend factory, realized immediately.
    pub fn initialize_with<F>(&mut self, factory: F)
    where
        F: FnOnce() -> Result<B, PlatformError>,
    {
        if self.forest.is_some() {
            debug!("tray already initialized");
            return;
        }
        self.forest = Some(MenuForest::new());
        self.realize(factory);
    }

    /// Called by the event loop once it is able to host native UI.
    pub fn on_event_loop_started(&mut self) {
        self.loop_started = true;
        if self.native_pending {
            self.realize(B::create);
        }
    }

    fn realize<F>(&mut self, factory: F)
    where
        F: FnOnce() -> Result<B, PlatformError>,
    {
        self.native_pending = false;
        match factory() {
            Ok(backend) => {
                self.backend = Some(backend);
                self.replay();
                info!("tray icon registered");
            }
            Err(e) => {
                warn!("tray icon unavailable, continuing without it: {e}");
            }
        }
    }

    /// Push the whole model onto a freshly created backend.
    fn replay(&mut self) {
        let (Some(backend), Some(forest)) = (self.backend.as_mut(), self.forest.as_ref()) else {
            return;
        };
        if let Some(icon) = &self.icon {
            if let Err(e) = backend.set_icon(icon) {
                warn!("tray icon image rejected: {e}");
            }
        }
        if self.icon_as_template {
            backend.set_icon_as_template(true);
        }
        if let Some(text) = &self.tooltip {
            backend.set_tooltip(text);
        }
        if let Some(text) = &self.title {
            backend.set_title(text);
        }
        for (parent, slot) in forest.walk() {
            match slot {
                MenuSlot::Separator => backend.append_separator(parent),
                MenuSlot::Item(id) => {
                    if let Some(node) = forest.get(id) {
                        backend.append_item(parent, node);
                        if !node.tooltip.is_empty() {
                            backend.set_item_tooltip(node);
                        }
                    }
                }
            }
        }
    }

    /// Remove the status icon and drop the menu. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.native_pending = false;
        if self.backend.take().is_some() {
            info!("tray icon removed");
        }
        self.forest = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.forest.is_some()
    }

    /// Whether a native icon is currently registered.
    pub fn has_native_icon(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn forest(&self) -> Option<&MenuForest> {
        self.forest.as_ref()
    }

    pub fn item(&self, id: impl Into<MenuItemId>) -> Option<&MenuNode> {
        self.forest.as_ref()?.get(id.into())
    }

    // =========================================================================
    // Appearance
    // =========================================================================

    /// Decode `bytes` and make them the status icon. Undecodable bytes leave
    /// the current icon in place.
    pub fn set_icon(&mut self, bytes: &[u8]) {
        let image = match decode_icon(bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!("tray icon not changed: {e}");
                return;
            }
        };
        if let Some(backend) = self.backend.as_mut() {
            if let Err(e) = backend.set_icon(&image) {
                warn!("tray icon not changed: {e}");
                return;
            }
        }
        debug!(width = image.width, height = image.height, "tray icon set");
        self.icon = Some(image);
    }

    pub fn icon(&self) -> Option<&IconImage> {
        self.icon.as_ref()
    }

    /// Mark the icon as a macOS template image. Kept across icon changes;
    /// other platforms ignore it.
    pub fn set_icon_as_template(&mut self, template: bool) {
        if let Some(backend) = self.backend.as_mut() {
            backend.set_icon_as_template(template);
        }
        self.icon_as_template = template;
    }

    pub fn icon_as_template(&self) -> bool {
        self.icon_as_template
    }

    pub fn set_tooltip(&mut self, text: &str) {
        let cut = truncate_tooltip(text);
        if cut.len() < text.len() {
            debug!(len = text.len(), "tray tooltip truncated");
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.set_tooltip(cut);
        }
        self.tooltip = Some(cut.to_string());
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Text shown next to the icon in the macOS menu bar. Ignored elsewhere.
    pub fn set_title(&mut self, text: &str) {
        if let Some(backend) = self.backend.as_mut() {
            backend.set_title(text);
        }
        self.title = Some(text.to_string());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    // =========================================================================
    // Menu structure
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub fn add_menu_item(
        &mut self,
        id: impl Into<MenuItemId>,
        label: &str,
        shortcut: &str,
        disabled: bool,
        checked: bool,
        parent: impl Into<MenuItemId>,
        is_submenu: bool,
    ) {
        let id = id.into();
        let parent = parent.into();
        self.insert_item(MenuNode {
            id,
            label: label.to_string(),
            shortcut: shortcut.to_string(),
            tooltip: String::new(),
            disabled,
            checked,
            kind: if is_submenu {
                NodeKind::Submenu
            } else {
                NodeKind::Leaf
            },
            parent,
        });
    }

    /// Insert `node` into the model and the native menu. Returns whether it
    /// was accepted.
    pub(crate) fn insert_item(&mut self, node: MenuNode) -> bool {
        let (id, parent) = (node.id, node.parent);
        let Some(forest) = self.forest.as_mut() else {
            debug!(%id, "tray not initialized, menu item ignored");
            return false;
        };
        match forest.insert(node) {
            Ok(node) => {
                if let Some(backend) = self.backend.as_mut() {
                    backend.append_item(parent, node);
                }
                true
            }
            Err(reason) => {
                debug!(%id, %parent, "menu item ignored: {reason}");
                false
            }
        }
    }

    pub fn add_separator(&mut self, parent: impl Into<MenuItemId>) {
        let parent = parent.into();
        let Some(forest) = self.forest.as_mut() else {
            debug!(%parent, "tray not initialized, separator ignored");
            return;
        };
        match forest.insert_separator(parent) {
            Ok(()) => {
                if let Some(backend) = self.backend.as_mut() {
                    backend.append_separator(parent);
                }
            }
            Err(reason) => debug!(%parent, "separator ignored: {reason}"),
        }
    }

    // =========================================================================
    // In-place updates
    // =========================================================================

    fn edit_item(
        &mut self,
        id: MenuItemId,
        what: &str,
        edit: impl FnOnce(&mut MenuNode),
        push: fn(&mut B, &MenuNode),
    ) {
        let Some(forest) = self.forest.as_mut() else {
            debug!(%id, "tray not initialized, {what} ignored");
            return;
        };
        let Some(node) = forest.get_mut(id) else {
            debug!(%id, "no such menu item, {what} ignored");
            return;
        };
        edit(node);
        if let Some(backend) = self.backend.as_mut() {
            push(backend, node);
        }
    }

    pub fn set_item_label(&mut self, id: impl Into<MenuItemId>, text: &str) {
        self.edit_item(
            id.into(),
            "label",
            |node| node.label = text.to_string(),
            B::sync_item,
        );
    }

    pub fn set_item_checked(&mut self, id: impl Into<MenuItemId>, checked: bool) {
        self.edit_item(
            id.into(),
            "checked",
            |node| node.checked = checked,
            B::sync_item,
        );
    }

    pub fn set_item_disabled(&mut self, id: impl Into<MenuItemId>, disabled: bool) {
        self.edit_item(
            id.into(),
            "disabled",
            |node| node.disabled = disabled,
            B::sync_item,
        );
    }

    /// Hover text for one item. Kept in the model on every platform; shown
    /// only where the native menu supports it.
    pub fn set_item_tooltip(&mut self, id: impl Into<MenuItemId>, text: &str) {
        self.edit_item(
            id.into(),
            "tooltip",
            |node| node.tooltip = text.to_string(),
            B::set_item_tooltip,
        );
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Filter a native event down to what the host should see.
    ///
    /// Leaf activations pass through; submenu, disabled and unknown ids are
    /// dropped. Native check items flip themselves when clicked, so the
    /// model's state is pushed back before returning.
    pub fn dispatch(&mut self, event: TrayEvent) -> Option<TrayEvent> {
        let TrayEvent::MenuItemActivated(id) = event else {
            return Some(event);
        };
        let Some(node) = self.forest.as_ref().and_then(|f| f.get(id)) else {
            debug!(%id, "click on unknown menu id");
            return None;
        };
        if node.is_submenu() || node.disabled {
            return None;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.sync_item(node);
        }
        Some(event)
    }

    /// Ask the running event loop to return. Does not wait for it.
    pub fn quit(&self) {
        info!("tray quit requested");
        self.quit.request();
    }

    pub fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }
}
