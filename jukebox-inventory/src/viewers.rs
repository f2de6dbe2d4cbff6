use std::collections::HashMap;

use jukebox_core::Actor;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::menu::{Menu, MenuId};

/// A menu currently shown to a player, together with the player as they were
/// when it was opened.
#[derive(Clone, Debug)]
pub struct OpenMenu {
    pub viewer: Actor,
    pub menu: Menu,
}

/// Which player is looking at which menu.
///
/// One menu per player; opening another replaces the previous entry.
#[derive(Default)]
pub struct ViewerRegistry {
    open: RwLock<HashMap<Uuid, OpenMenu>>,
}

impl ViewerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, viewer: Actor, menu: Menu) {
        self.open
            .write()
            .insert(viewer.uuid, OpenMenu { viewer, menu });
    }

    pub fn close(&self, viewer: Uuid) -> Option<OpenMenu> {
        self.open.write().remove(&viewer)
    }

    #[must_use]
    pub fn current(&self, viewer: Uuid) -> Option<OpenMenu> {
        self.open.read().get(&viewer).cloned()
    }

    /// Everyone whose open menu is `id`.
    #[must_use]
    pub fn viewers_of(&self, id: &MenuId) -> Vec<OpenMenu> {
        self.open
            .read()
            .values()
            .filter(|open| &open.menu.id == id)
            .cloned()
            .collect()
    }

    /// Swaps in a freshly rendered menu, unless the viewer has moved on to a
    /// different menu in the meantime or already holds a newer render.
    pub fn replace(&self, viewer: Uuid, menu: Menu) -> bool {
        match self.open.write().get_mut(&viewer) {
            Some(open) if open.menu.id == menu.id && open.menu.generation <= menu.generation => {
                open.menu = menu;
                true
            }
            _ => false,
        }
    }

    /// Forgets every viewer of `id` and returns them.
    pub fn close_all(&self, id: &MenuId) -> Vec<Uuid> {
        let mut open = self.open.write();
        let viewers: Vec<Uuid> = open
            .iter()
            .filter(|(_, open)| &open.menu.id == id)
            .map(|(uuid, _)| *uuid)
            .collect();
        for viewer in &viewers {
            open.remove(viewer);
        }
        viewers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.read().is_empty()
    }
}
