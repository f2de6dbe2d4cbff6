pub mod command;
pub mod console;
pub mod cooldown;
pub mod error;
pub mod host;
pub mod jukebox;
pub mod menu_sync;
pub mod placeholder;
pub mod plugin;
pub mod timer;

pub use cooldown::CooldownTracker;
pub use error::JukeboxError;
pub use host::{Host, MenuSink, Players, WorldAudio};
pub use jukebox::{Jukebox, JukeboxRegistry, JukeboxSettings, RegistryError, TransitionListener};
pub use menu_sync::MenuSyncBroadcaster;
pub use plugin::{EventOutcome, JukeboxPlugin};
pub use timer::{PlaybackTimer, TimerError, TimerHandle, TimerId};
