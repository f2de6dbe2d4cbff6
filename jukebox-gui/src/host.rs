//! What the plugin needs from the server it runs in.
//!
//! Every method here may be called while a jukebox holds its own lock, so
//! implementations must hand work off instead of blocking.

use jukebox_core::{Actor, Location, TrackId};
use jukebox_inventory::{ItemStack, Menu, MenuError};
use uuid::Uuid;

pub trait WorldAudio: Send + Sync {
    /// Starts `track` at `location` on the record channel and marks the
    /// jukebox block as playing.
    fn play_record(&self, location: &Location, track: &TrackId, volume: f32);

    /// Stops `track` at `location` and marks the jukebox block as idle.
    fn stop_record(&self, location: &Location, track: &TrackId);

    /// The note particle pulse shown above a playing jukebox.
    fn spawn_notes(&self, location: &Location);
}

pub trait MenuSink: Send + Sync {
    /// Shows `menu` to `viewer`, replacing whatever they had open.
    fn show(&self, viewer: &Actor, menu: &Menu) -> Result<(), MenuError>;

    fn close(&self, viewer: Uuid);
}

pub trait Players: Send + Sync {
    fn send_message(&self, player: Uuid, message: &str);

    fn give_item(&self, player: Uuid, item: ItemStack);
}

/// Everything at once, as implemented by a real server binding.
pub trait Host: WorldAudio + MenuSink + Players {}

impl<T: WorldAudio + MenuSink + Players> Host for T {}
