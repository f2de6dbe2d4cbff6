use std::collections::BTreeMap;
use std::fmt;

use jukebox_core::{Location, TrackId};

/// Stable key of the menu belonging to one jukebox.
///
/// The three coordinates are always the last three `_`-separated parts, so
/// the key stays unique even for world names containing underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MenuId(String);

impl MenuId {
    #[must_use]
    pub fn for_location(location: &Location) -> Self {
        Self(format!(
            "jukebox_gui_{}_{}_{}_{}",
            location.world,
            location.x(),
            location.y(),
            location.z()
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuText {
    Plain(String),
    /// Rendered client side, `fallback` is shown by clients missing the key.
    Translatable {
        key: String,
        fallback: String,
        color: &'static str,
    },
}

/// What clicking a cell does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickAction {
    /// Start `track`. `replace` is set when the menu was rendered while
    /// another song was playing, so the click is meant to cut it off.
    Play { track: TrackId, replace: bool },
    Stop,
    Close,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub icon: String,
    pub name: MenuText,
    pub lore: Vec<String>,
    pub glowing: bool,
    pub action: Option<ClickAction>,
}

impl Cell {
    pub fn new(icon: impl Into<String>, name: MenuText) -> Self {
        Self {
            icon: icon.into(),
            name,
            lore: Vec::new(),
            glowing: false,
            action: None,
        }
    }
}

/// A chest-like grid of cells, independent of how the host draws it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    pub id: MenuId,
    /// The jukebox this menu controls.
    pub location: Location,
    pub title: String,
    pub rows: u8,
    /// Generation of the playback state this menu was drawn from.
    pub generation: u64,
    pub(crate) cells: BTreeMap<usize, Cell>,
}

impl Menu {
    #[must_use]
    pub fn new(location: &Location, title: impl Into<String>, rows: u8) -> Self {
        Self {
            id: MenuId::for_location(location),
            location: location.clone(),
            title: title.into(),
            rows,
            generation: 0,
            cells: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.rows as usize * 9
    }

    #[must_use]
    pub const fn last(&self) -> usize {
        self.size() - 1
    }

    /// Out of range slots are ignored.
    pub fn set(&mut self, slot: usize, cell: Cell) {
        if slot < self.size() {
            self.cells.insert(slot, cell);
        } else {
            log::debug!("Dropping cell for slot {slot} outside of menu {}", self.id);
        }
    }

    #[must_use]
    pub fn cell(&self, slot: usize) -> Option<&Cell> {
        self.cells.get(&slot)
    }

    #[must_use]
    pub fn action(&self, slot: usize) -> Option<&ClickAction> {
        self.cell(slot).and_then(|cell| cell.action.as_ref())
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().map(|(slot, cell)| (*slot, cell))
    }
}
