//! `tray-icon` backed status icon.
//!
//! Leaves start as plain items and become check items the first time they
//! are checked; the swap keeps their position. Native menu ids are the
//! decimal form of the [`MenuItemId`]. Event handlers are process global in
//! `tray-icon`, so the sink is installed once per event loop.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use tray_icon::menu::{
    CheckMenuItem, IsMenuItem, Menu, MenuEvent, MenuId, MenuItem, MenuItemKind,
    PredefinedMenuItem, Submenu,
};
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};
use velo_common::{ClickButton, IconImage, MenuItemId, PlatformError};

use crate::backend::TrayBackend;
use crate::events::TrayEvent;
use crate::forest::{MenuNode, NodeKind};

enum Leaf {
    Plain(MenuItem),
    Check(CheckMenuItem),
}

/// The native menu a node is attached to.
enum Container<'a> {
    Root(&'a Menu),
    Sub(&'a Submenu),
}

impl Container<'_> {
    fn items(&self) -> Vec<MenuItemKind> {
        match self {
            Container::Root(menu) => menu.items(),
            Container::Sub(submenu) => submenu.items(),
        }
    }

    fn append(&self, item: &dyn IsMenuItem) -> tray_icon::menu::Result<()> {
        match self {
            Container::Root(menu) => menu.append(item),
            Container::Sub(submenu) => submenu.append(item),
        }
    }

    fn insert(&self, item: &dyn IsMenuItem, position: usize) -> tray_icon::menu::Result<()> {
        match self {
            Container::Root(menu) => menu.insert(item, position),
            Container::Sub(submenu) => submenu.insert(item, position),
        }
    }

    fn remove(&self, item: &dyn IsMenuItem) -> tray_icon::menu::Result<()> {
        match self {
            Container::Root(menu) => menu.remove(item),
            Container::Sub(submenu) => submenu.remove(item),
        }
    }
}

pub struct NativeTray {
    icon: TrayIcon,
    root: Menu,
    submenus: HashMap<MenuItemId, Submenu>,
    leaves: HashMap<MenuItemId, Leaf>,
}

fn native_id(id: MenuItemId) -> MenuId {
    MenuId::new(id.0.to_string())
}

fn check_item(node: &MenuNode) -> CheckMenuItem {
    CheckMenuItem::with_id(
        native_id(node.id),
        node.display_text(),
        !node.disabled,
        node.checked,
        None,
    )
}

impl NativeTray {
    fn container(&self, parent: MenuItemId) -> Option<Container<'_>> {
        if parent.is_root() {
            Some(Container::Root(&self.root))
        } else {
            self.submenus.get(&parent).map(Container::Sub)
        }
    }

    fn attach(&self, parent: MenuItemId, item: &dyn IsMenuItem) {
        let Some(container) = self.container(parent) else {
            debug!(%parent, "native submenu missing");
            return;
        };
        if let Err(e) = container.append(item) {
            warn!(%parent, "failed to append native menu item: {e}");
        }
    }
}

/// Replace `plain` with a check item for `node` in the same slot.
fn swap_for_check(
    container: &Container<'_>,
    node: &MenuNode,
    plain: &MenuItem,
) -> Option<CheckMenuItem> {
    let position = container
        .items()
        .iter()
        .position(|item| item.id() == plain.id())?;
    let check = check_item(node);
    let swapped = container
        .remove(plain)
        .and_then(|()| container.insert(&check, position));
    match swapped {
        Ok(()) => Some(check),
        Err(e) => {
            warn!(id = %node.id, "failed to make menu item checkable: {e}");
            None
        }
    }
}

impl TrayBackend for NativeTray {
    fn create() -> Result<Self, PlatformError> {
        init_platform()?;
        let root = Menu::new();
        let icon = TrayIconBuilder::new()
            .with_menu(Box::new(root.clone()))
            .with_menu_on_left_click(true)
            .build()
            .map_err(|e| PlatformError::TrayRegistration(e.to_string()))?;
        Ok(Self {
            icon,
            root,
            submenus: HashMap::new(),
            leaves: HashMap::new(),
        })
    }

    fn set_icon(&mut self, image: &IconImage) -> Result<(), PlatformError> {
        let icon = Icon::from_rgba(image.rgba.clone(), image.width, image.height)
            .map_err(|e| PlatformError::IconDecode(e.to_string()))?;
        self.icon
            .set_icon(Some(icon))
            .map_err(|e| PlatformError::TrayRegistration(e.to_string()))
    }

    #[cfg(target_os = "macos")]
    fn set_icon_as_template(&mut self, template: bool) {
        self.icon.set_icon_as_template(template);
    }

    fn set_tooltip(&mut self, text: &str) {
        if let Err(e) = self.icon.set_tooltip(Some(text)) {
            warn!("failed to set tray tooltip: {e}");
        }
    }

    fn set_title(&mut self, text: &str) {
        self.icon.set_title(Some(text));
    }

    fn append_item(&mut self, parent: MenuItemId, node: &MenuNode) {
        let text = node.display_text();
        match node.kind {
            NodeKind::Submenu => {
                let submenu = Submenu::with_id(native_id(node.id), &text, !node.disabled);
                self.attach(parent, &submenu);
                self.submenus.insert(node.id, submenu);
            }
            NodeKind::Leaf if node.checked => {
                let item = check_item(node);
                self.attach(parent, &item);
                self.leaves.insert(node.id, Leaf::Check(item));
            }
            NodeKind::Leaf => {
                let item = MenuItem::with_id(native_id(node.id), &text, !node.disabled, None);
                self.attach(parent, &item);
                self.leaves.insert(node.id, Leaf::Plain(item));
            }
        }
    }

    fn append_separator(&mut self, parent: MenuItemId) {
        self.attach(parent, &PredefinedMenuItem::separator());
    }

    fn sync_item(&mut self, node: &MenuNode) {
        let text = node.display_text();
        match self.leaves.get(&node.id) {
            Some(Leaf::Check(item)) => {
                item.set_text(&text);
                item.set_enabled(!node.disabled);
                item.set_checked(node.checked);
            }
            Some(Leaf::Plain(item)) if node.checked => {
                let check = self
                    .container(node.parent)
                    .and_then(|container| swap_for_check(&container, node, item));
                if let Some(check) = check {
                    self.leaves.insert(node.id, Leaf::Check(check));
                }
            }
            Some(Leaf::Plain(item)) => {
                item.set_text(&text);
                item.set_enabled(!node.disabled);
            }
            None => {
                if let Some(submenu) = self.submenus.get(&node.id) {
                    submenu.set_text(&text);
                    submenu.set_enabled(!node.disabled);
                }
            }
        }
    }
}

/// Forward native tray input to `sink`. Replaces any previous sink.
pub fn install_event_sink<F>(sink: F)
where
    F: Fn(TrayEvent) + Send + Sync + 'static,
{
    let sink = Arc::new(sink);

    let menu_sink = Arc::clone(&sink);
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        match event.id.0.parse::<u32>() {
            Ok(id) => menu_sink(TrayEvent::MenuItemActivated(MenuItemId(id))),
            Err(_) => debug!(id = ?event.id, "menu event from a foreign menu"),
        }
    }));

    TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
        if let TrayIconEvent::Click {
            button,
            button_state: MouseButtonState::Up,
            ..
        } = event
        {
            let button = match button {
                MouseButton::Left => ClickButton::Left,
                MouseButton::Right => ClickButton::Right,
                _ => ClickButton::Middle,
            };
            sink(TrayEvent::IconClicked(button));
        }
    }));
}

pub fn clear_event_sink() {
    MenuEvent::set_event_handler(None::<fn(MenuEvent)>);
    TrayIconEvent::set_event_handler(None::<fn(TrayIconEvent)>);
}

/// GTK must be running before a tray icon can exist on Linux.
#[cfg(target_os = "linux")]
pub fn init_platform() -> Result<(), PlatformError> {
    gtk::init().map_err(|e| PlatformError::TrayRegistration(format!("gtk init failed: {e}")))
}

#[cfg(not(target_os = "linux"))]
pub fn init_platform() -> Result<(), PlatformError> {
    Ok(())
}

/// Drain pending GTK work. The Linux tray only delivers events while GTK is
/// iterated; elsewhere this does nothing.
pub fn pump_platform_events() {
    #[cfg(target_os = "linux")]
    {
        while gtk::events_pending() {
            gtk::main_iteration_do(false);
        }
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn checking_a_plain_item_keeps_its_slot() {
        let menu = Menu::new();
        let items: Vec<MenuItem> = (1..=3)
            .map(|i| MenuItem::with_id(native_id(MenuItemId(i)), format!("item {i}"), true, None))
            .collect();
        for item in &items {
            menu.append(item).unwrap();
        }

        let mut node = MenuNode::leaf(2, "item 2");
        node.checked = true;
        let check = swap_for_check(&Container::Root(&menu), &node, &items[1]).unwrap();
        assert!(check.is_checked());

        let slots = menu.items();
        let ids: Vec<&str> = slots.iter().map(|item| item.id().0.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert!(matches!(slots[1], MenuItemKind::Check(_)));
        assert!(matches!(slots[0], MenuItemKind::MenuItem(_)));
    }
}
