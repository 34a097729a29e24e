//! Building the menu from a declarative [`MenuEntry`] list.

use std::collections::HashSet;

use tracing::debug;
use velo_common::{MenuEntry, MenuItemId};

use crate::backend::TrayBackend;
use crate::controller::TrayController;
use crate::forest::{MenuNode, NodeKind};

struct IdAllocator {
    taken: HashSet<MenuItemId>,
    /// `None` once the id space above the floor is used up.
    next: Option<u32>,
}

impl IdAllocator {
    fn next(&mut self) -> Option<MenuItemId> {
        loop {
            let candidate = MenuItemId(self.next?);
            self.next = candidate.0.checked_add(1);
            if self.taken.insert(candidate) {
                return Some(candidate);
            }
        }
    }
}

fn collect_explicit(entries: &[MenuEntry], out: &mut HashSet<MenuItemId>) {
    for entry in entries {
        if let Some(id) = entry.id {
            out.insert(id);
        }
        if let Some(children) = &entry.submenu {
            collect_explicit(children, out);
        }
    }
}

impl<B: TrayBackend> TrayController<B> {
    /// Append `entries` under `parent`, in order.
    ///
    /// Entries without an id get one above every id already in use, so
    /// hosts can mix fixed ids (for items they react to) with anonymous
    /// ones. Returns the id of every entry that was actually added, depth
    /// first. An entry the menu refuses (a duplicate id, say) is skipped
    /// together with its children.
    pub fn apply_menu(
        &mut self,
        parent: impl Into<MenuItemId>,
        entries: &[MenuEntry],
    ) -> Vec<MenuItemId> {
        let mut taken = HashSet::new();
        collect_explicit(entries, &mut taken);
        let floor = self
            .forest()
            .map(|f| f.max_id())
            .into_iter()
            .chain(taken.iter().copied())
            .max()
            .unwrap_or(MenuItemId::ROOT);
        let mut ids = IdAllocator {
            taken,
            next: floor.0.checked_add(1),
        };

        let mut assigned = Vec::new();
        self.apply_entries(parent.into(), entries, &mut ids, &mut assigned);
        assigned
    }

    fn apply_entries(
        &mut self,
        parent: MenuItemId,
        entries: &[MenuEntry],
        ids: &mut IdAllocator,
        assigned: &mut Vec<MenuItemId>,
    ) {
        for entry in entries {
            if entry.separator {
                self.add_separator(parent);
                continue;
            }
            let Some(id) = entry.id.or_else(|| ids.next()) else {
                debug!(label = %entry.label, "no menu id left, entry skipped");
                continue;
            };
            let node = MenuNode {
                id,
                label: entry.label.clone(),
                shortcut: entry.shortcut.clone(),
                tooltip: String::new(),
                disabled: entry.disabled,
                checked: entry.checked,
                kind: if entry.submenu.is_some() {
                    NodeKind::Submenu
                } else {
                    NodeKind::Leaf
                },
                parent,
            };
            if !self.insert_item(node) {
                continue;
            }
            if !entry.tooltip.is_empty() {
                self.set_item_tooltip(id, &entry.tooltip);
            }
            assigned.push(id);
            if let Some(children) = &entry.submenu {
                self.apply_entries(id, children, ids, assigned);
            }
        }
    }
}
