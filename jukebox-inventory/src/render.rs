use jukebox_core::{text::brand, Location, Permission, PermissionSet, TrackCatalog, TrackId};

use crate::menu::{Cell, ClickAction, Menu, MenuText};

const ROWS: u8 = 6;
const FIRST_TRACK_SLOT: usize = 9 + 1;
const DISC_NAME_COLOR: &str = "#FF331C";
const UNKNOWN_DISC: &str = "Unknown Disc (Outdated Client)";
const IDLE_ICON: &str = "minecraft:red_stained_glass_pane";
const PLAYING_ICON: &str = "minecraft:lime_stained_glass_pane";
const CLOSE_ICON: &str = "minecraft:spectral_arrow";

/// What a jukebox looked like when its menu was drawn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub current: Option<TrackId>,
    pub last_selected_by: Option<String>,
    /// Grows with every change of the jukebox.
    pub generation: u64,
}

/// Builds the song picker for one viewer.
///
/// Tracks fill the inner columns starting on the second row, the current
/// track glows, the status cell sits in the middle of the bottom row and the
/// close button in its last slot. Click actions are only attached where the
/// viewer holds the matching permission.
#[must_use]
pub fn render_menu(
    location: &Location,
    title: &str,
    catalog: &TrackCatalog,
    snapshot: &PlaybackSnapshot,
    permissions: &PermissionSet,
) -> Menu {
    let mut menu = Menu::new(location, title, ROWS);
    menu.generation = snapshot.generation;
    let can_play = permissions.has(Permission::Play);
    let can_stop = permissions.has(Permission::Stop);
    let track_area_end = menu.size() - 9;

    let mut slot = FIRST_TRACK_SLOT;
    for track in catalog.tracks() {
        let Some(icon) = track.item_key() else {
            continue;
        };
        if slot >= track_area_end {
            log::debug!("Menu {} is full, not showing {track}", menu.id);
            break;
        }

        let is_current = snapshot.current.as_ref() == Some(track);
        let mut cell = Cell::new(
            icon,
            MenuText::Translatable {
                key: track.item_translation_key(),
                fallback: UNKNOWN_DISC.to_string(),
                color: DISC_NAME_COLOR,
            },
        );
        cell.glowing = is_current;
        if is_current {
            if can_stop {
                cell.lore = vec![String::new(), brand("<error>⏹ Click to stop")];
                cell.action = Some(ClickAction::Stop);
            }
        } else if can_play {
            cell.lore = vec![String::new(), brand("<green>▶ Click to play")];
            cell.action = Some(ClickAction::Play {
                track: track.clone(),
                replace: snapshot.current.is_some(),
            });
        }
        menu.set(slot, cell);

        slot += 1;
        if (slot + 1) % 9 == 0 {
            slot += 2;
        }
    }

    let status_slot = menu.last() - 4;
    menu.set(status_slot, status_cell(snapshot, can_play, can_stop));

    let mut close = Cell::new(CLOSE_ICON, MenuText::Plain(brand("<title>Close")));
    close.action = Some(ClickAction::Close);
    let close_slot = menu.last();
    menu.set(close_slot, close);

    menu
}

fn status_cell(snapshot: &PlaybackSnapshot, can_play: bool, can_stop: bool) -> Cell {
    let Some(current) = &snapshot.current else {
        let mut cell = Cell::new(
            IDLE_ICON,
            MenuText::Plain(brand("<error>Nothing is playing")),
        );
        if can_play {
            cell.lore = vec![String::new(), brand("<light>Choose a song!")];
        }
        return cell;
    };

    let icon = current
        .item_key()
        .unwrap_or_else(|| PLAYING_ICON.to_string());
    let mut cell = Cell::new(icon, MenuText::Plain(brand("<green>Now playing:")));
    cell.lore.push(brand(&format!(
        "<dull>Played by: {}",
        snapshot.last_selected_by.as_deref().unwrap_or("Unknown")
    )));
    if can_stop {
        cell.lore.push(String::new());
        cell.lore.push(brand("<error>⏹ Click to stop"));
        cell.action = Some(ClickAction::Stop);
    }
    cell
}
