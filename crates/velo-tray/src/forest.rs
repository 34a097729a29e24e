//! ID-addressed menu forest.
//!
//! The forest is the shell's own record of the tray menu. Every node is
//! reachable by its host-assigned [`MenuItemId`]; every parent is either the
//! root (`0`) or a submenu already in the forest. Separators are positional
//! slots inside a parent and carry no id. The native menu is a projection of
//! this model and is rebuilt from it whenever a native handle is created.

use std::collections::HashMap;
use std::fmt;

use velo_common::MenuItemId;

use crate::text::display_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Submenu,
}

/// A labeled menu node.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuNode {
    pub id: MenuItemId,
    pub label: String,
    pub shortcut: String,
    pub tooltip: String,
    pub disabled: bool,
    pub checked: bool,
    pub kind: NodeKind,
    pub parent: MenuItemId,
}

impl MenuNode {
    pub fn leaf(id: impl Into<MenuItemId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shortcut: String::new(),
            tooltip: String::new(),
            disabled: false,
            checked: false,
            kind: NodeKind::Leaf,
            parent: MenuItemId::ROOT,
        }
    }

    pub fn submenu(id: impl Into<MenuItemId>, label: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Submenu,
            ..Self::leaf(id, label)
        }
    }

    pub fn under(mut self, parent: impl Into<MenuItemId>) -> Self {
        self.parent = parent.into();
        self
    }

    pub fn is_submenu(&self) -> bool {
        self.kind == NodeKind::Submenu
    }

    /// Text as shown natively: label, then tab and shortcut when present.
    pub fn display_text(&self) -> String {
        display_text(&self.label, &self.shortcut)
    }
}

/// One position inside a parent's child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSlot {
    Item(MenuItemId),
    Separator,
}

/// Why an insertion was refused. Refusals leave the forest untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    ReservedId,
    DuplicateId(MenuItemId),
    UnknownParent(MenuItemId),
    ParentNotSubmenu(MenuItemId),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ReservedId => write!(f, "id 0 is reserved for the root menu"),
            Rejection::DuplicateId(id) => write!(f, "id {id} is already in the menu"),
            Rejection::UnknownParent(id) => write!(f, "parent {id} is not in the menu"),
            Rejection::ParentNotSubmenu(id) => write!(f, "parent {id} is not a submenu"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuForest {
    nodes: HashMap<MenuItemId, MenuNode>,
    children: HashMap<MenuItemId, Vec<MenuSlot>>,
}

impl Default for MenuForest {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuForest {
    /// An empty forest holding only the root menu.
    pub fn new() -> Self {
        let mut children = HashMap::new();
        children.insert(MenuItemId::ROOT, Vec::new());
        Self {
            nodes: HashMap::new(),
            children,
        }
    }

    fn check_parent(&self, parent: MenuItemId) -> Result<(), Rejection> {
        if self.children.contains_key(&parent) {
            return Ok(());
        }
        if self.nodes.contains_key(&parent) {
            Err(Rejection::ParentNotSubmenu(parent))
        } else {
            Err(Rejection::UnknownParent(parent))
        }
    }

    /// Append `node` as the last child of `node.parent`.
    pub fn insert(&mut self, node: MenuNode) -> Result<&MenuNode, Rejection> {
        if node.id.is_root() {
            return Err(Rejection::ReservedId);
        }
        if self.nodes.contains_key(&node.id) {
            return Err(Rejection::DuplicateId(node.id));
        }
        self.check_parent(node.parent)?;

        let id = node.id;
        if node.is_submenu() {
            self.children.insert(id, Vec::new());
        }
        if let Some(slots) = self.children.get_mut(&node.parent) {
            slots.push(MenuSlot::Item(id));
        }
        Ok(self.nodes.entry(id).or_insert(node))
    }

    /// Append a separator as the last child of `parent`.
    pub fn insert_separator(&mut self, parent: MenuItemId) -> Result<(), Rejection> {
        self.check_parent(parent)?;
        if let Some(slots) = self.children.get_mut(&parent) {
            slots.push(MenuSlot::Separator);
        }
        Ok(())
    }

    pub fn get(&self, id: MenuItemId) -> Option<&MenuNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: MenuItemId) -> Option<&mut MenuNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: MenuItemId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Child slots of the root or of a submenu, in insertion order.
    pub fn children(&self, parent: MenuItemId) -> Option<&[MenuSlot]> {
        self.children.get(&parent).map(Vec::as_slice)
    }

    /// Number of labeled nodes (separators excluded).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Largest id in use, or the root id for an empty forest.
    pub fn max_id(&self) -> MenuItemId {
        self.nodes.keys().copied().max().unwrap_or(MenuItemId::ROOT)
    }


    /// Every slot paired with its parent, parents before their children.
    ///
    /// Replaying this sequence against an empty native menu rebuilds the
    /// same tree.
    pub fn walk(&self) -> Vec<(MenuItemId, MenuSlot)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk_into(MenuItemId::ROOT, &mut out);
        out
    }

    fn walk_into(&self, parent: MenuItemId, out: &mut Vec<(MenuItemId, MenuSlot)>) {
        let Some(slots) = self.children.get(&parent) else {
            return;
        };
        for slot in slots {
            out.push((parent, *slot));
            if let MenuSlot::Item(id) = slot {
                if self.children.contains_key(id) {
                    self.walk_into(*id, out);
                }
            }
        }
    }
}
