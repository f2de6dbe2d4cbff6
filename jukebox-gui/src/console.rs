//! A stand-in server driven from stdin, for trying the plugin without one.

use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use jukebox_core::{Actor, Location, PermissionSet, TrackId};
use jukebox_inventory::{ItemStack, JukeboxItem, Menu, MenuError, MenuText};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::command::CommandSender;
use crate::host::{MenuSink, Players, WorldAudio};
use crate::plugin::JukeboxPlugin;

pub const CONSOLE_WORLD: &str = "world";

/// Prints what a server would show its players.
#[derive(Default)]
pub struct ConsoleHost {
    names: Mutex<HashMap<Uuid, String>>,
}

impl ConsoleHost {
    /// A player with every permission, known by name from now on.
    pub fn player(&self, name: &str) -> Actor {
        let uuid = Uuid::new_v3(&Uuid::NAMESPACE_OID, name.as_bytes());
        self.names.lock().insert(uuid, name.to_string());
        Actor::new(uuid, name, CONSOLE_WORLD).with_permissions(PermissionSet::all())
    }

    fn name(&self, uuid: Uuid) -> String {
        self.names
            .lock()
            .get(&uuid)
            .cloned()
            .unwrap_or_else(|| uuid.to_string())
    }
}

impl WorldAudio for ConsoleHost {
    fn play_record(&self, location: &Location, track: &TrackId, volume: f32) {
        log::info!("♪ {location} plays {track} at volume {volume}");
    }

    fn stop_record(&self, location: &Location, track: &TrackId) {
        log::info!("♪ {location} stopped {track}");
    }

    fn spawn_notes(&self, location: &Location) {
        log::trace!("♪ notes at {}", location.particle_origin());
    }
}

impl MenuSink for ConsoleHost {
    fn show(&self, viewer: &Actor, menu: &Menu) -> Result<(), MenuError> {
        let cells = menu
            .cells()
            .map(|(slot, cell)| {
                let name = match &cell.name {
                    MenuText::Plain(text) => text.clone(),
                    MenuText::Translatable { key, .. } => key.clone(),
                };
                let marker = if cell.glowing { "*" } else { "" };
                format!("  [{slot}]{marker} {name}")
            })
            .join("\n");
        log::info!("{} sees {} ({}):\n{cells}", viewer.name, menu.title, menu.id);
        Ok(())
    }

    fn close(&self, viewer: Uuid) {
        log::info!("Closed the menu of {}", self.name(viewer));
    }
}

impl Players for ConsoleHost {
    fn send_message(&self, player: Uuid, message: &str) {
        log::info!("[to {}] {message}", self.name(player));
    }

    fn give_item(&self, player: Uuid, item: ItemStack) {
        log::info!("Gave {} to {}", item.item, self.name(player));
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Not a number: {0}")]
    NotANumber(String),
}

/// One line typed into the console.
#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleLine<'a> {
    Place { player: &'a str, at: [i32; 3] },
    Break { player: &'a str, at: [i32; 3] },
    Interact { player: &'a str, at: [i32; 3] },
    Click { player: &'a str, slot: usize },
    Close { player: &'a str },
    Give { player: &'a str },
    Placeholder { player: &'a str, params: &'a str },
    List,
    Help,
    /// Anything else goes to the plugin's commands.
    Command(&'a str),
}

const HELP: &str = "place|break|interact <player> <x> <y> <z>, click <player> <slot>, \
close <player>, give <player>, placeholder <player> <params>, list";

impl<'a> ConsoleLine<'a> {
    pub fn parse(line: &'a str) -> Result<Self, ConsoleError> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(ConsoleLine::Help);
        };
        let args: Vec<&str> = words.collect();

        let at = |usage: &'static str| -> Result<(&'a str, [i32; 3]), ConsoleError> {
            match args.as_slice() {
                [player, x, y, z] => Ok((*player, [number(x)?, number(y)?, number(z)?])),
                _ => Err(ConsoleError::Usage(usage)),
            }
        };

        Ok(match keyword {
            "place" => {
                let (player, at) = at("place <player> <x> <y> <z>")?;
                ConsoleLine::Place { player, at }
            }
            "break" => {
                let (player, at) = at("break <player> <x> <y> <z>")?;
                ConsoleLine::Break { player, at }
            }
            "interact" => {
                let (player, at) = at("interact <player> <x> <y> <z>")?;
                ConsoleLine::Interact { player, at }
            }
            "click" => match args.as_slice() {
                [player, slot] => ConsoleLine::Click {
                    player: *player,
                    slot: slot
                        .parse()
                        .map_err(|_| ConsoleError::NotANumber((*slot).to_string()))?,
                },
                _ => return Err(ConsoleError::Usage("click <player> <slot>")),
            },
            "close" => match args.as_slice() {
                [player] => ConsoleLine::Close { player: *player },
                _ => return Err(ConsoleError::Usage("close <player>")),
            },
            "give" => match args.as_slice() {
                [player] => ConsoleLine::Give { player: *player },
                _ => return Err(ConsoleError::Usage("give <player>")),
            },
            "placeholder" => {
                let rest = line[keyword.len()..].trim_start();
                match rest.split_once(char::is_whitespace) {
                    Some((player, params)) if !params.trim().is_empty() => {
                        ConsoleLine::Placeholder {
                            player,
                            params: params.trim(),
                        }
                    }
                    _ => return Err(ConsoleError::Usage("placeholder <player> <params>")),
                }
            }
            "list" => ConsoleLine::List,
            "help" => ConsoleLine::Help,
            _ => ConsoleLine::Command(line),
        })
    }
}

fn number(word: &str) -> Result<i32, ConsoleError> {
    word.parse()
        .map_err(|_| ConsoleError::NotANumber(word.to_string()))
}

/// Plays the server for `plugin`.
pub struct Console {
    plugin: Arc<JukeboxPlugin>,
    host: Arc<ConsoleHost>,
}

impl Console {
    pub fn new(plugin: Arc<JukeboxPlugin>, host: Arc<ConsoleHost>) -> Self {
        Self { plugin, host }
    }

    pub async fn handle_line(&self, line: &str) {
        let parsed = match ConsoleLine::parse(line) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("{err}");
                return;
            }
        };
        let location = |[x, y, z]: [i32; 3]| Location::new(CONSOLE_WORLD, x, y, z);

        match parsed {
            ConsoleLine::Place { player, at } => {
                let actor = self.host.player(player);
                self.plugin
                    .on_block_place(&actor, location(at), &JukeboxItem::get_item());
            }
            ConsoleLine::Break { player, at } => {
                let actor = self.host.player(player);
                self.plugin.on_block_break(&actor, &location(at), false);
            }
            ConsoleLine::Interact { player, at } => {
                let actor = self.host.player(player);
                self.plugin.on_interact(&actor, &location(at));
            }
            ConsoleLine::Click { player, slot } => {
                let actor = self.host.player(player);
                self.plugin.on_menu_click(&actor, slot);
            }
            ConsoleLine::Close { player } => {
                let actor = self.host.player(player);
                self.plugin.on_menu_close(actor.uuid);
            }
            ConsoleLine::Give { player } => {
                let sender = CommandSender::Player(self.host.player(player));
                self.plugin.handle_command(&sender, "get-jukebox").await;
            }
            ConsoleLine::Placeholder { player, params } => {
                let actor = self.host.player(player);
                match self.plugin.placeholder(Some(&actor), params) {
                    Some(value) => log::info!("%{params}% = {value}"),
                    None => log::warn!("Unknown placeholder {params}"),
                }
            }
            ConsoleLine::List => {
                let registry = self.plugin.registry();
                log::info!("{} jukeboxes", registry.len());
                for location in registry.locations() {
                    let playing = registry
                        .now_playing(&location)
                        .map_or_else(|| "idle".to_string(), |track| track.to_string());
                    log::info!("  {location}: {playing}");
                }
            }
            ConsoleLine::Help => {
                log::info!("{HELP}");
                for line in self.plugin.command_help(&CommandSender::Console) {
                    log::info!("  {line}");
                }
            }
            ConsoleLine::Command(line) => {
                self.plugin
                    .handle_command(&CommandSender::Console, line)
                    .await;
            }
        }
    }
}
