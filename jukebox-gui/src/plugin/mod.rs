//! The jukebox plugin as a host server sees it: one value owning the
//! registry, the menus and the commands, fed by event handlers.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jukebox_config::{
    ConfigError, JukeboxConfig, LoadJSONConfiguration, LoadTomlConfiguration, SavedLocations,
};
use jukebox_core::Actor;
use jukebox_inventory::ViewerRegistry;
use parking_lot::RwLock;
use tokio::runtime::Handle;

use crate::command::{default_dispatcher, CommandDispatcher, CommandSender};
use crate::host::{Host, Players};
use crate::jukebox::{JukeboxRegistry, JukeboxSettings};
use crate::menu_sync::MenuSyncBroadcaster;
use crate::placeholder;
use crate::timer::PlaybackTimer;

mod events;
mod save;

pub use events::EventOutcome;
use save::LocationWriter;

pub struct JukeboxPlugin {
    config_path: PathBuf,
    config: RwLock<JukeboxConfig>,
    registry: JukeboxRegistry,
    menus: Arc<MenuSyncBroadcaster>,
    players: Arc<dyn Players>,
    dispatcher: CommandDispatcher,
    writer: Arc<LocationWriter>,
}

impl JukeboxPlugin {
    /// `config` is what was loaded from `config_path`; reloads read it again.
    pub fn new<H: Host + 'static>(
        config_path: PathBuf,
        config: JukeboxConfig,
        host: Arc<H>,
        timer: PlaybackTimer,
    ) -> Self {
        let menus = Arc::new(MenuSyncBroadcaster::new(
            Arc::new(ViewerRegistry::new()),
            host.clone(),
        ));
        let registry = JukeboxRegistry::new(
            JukeboxSettings::from(&config),
            timer,
            host.clone(),
            menus.clone(),
        );
        Self {
            config_path,
            config: RwLock::new(config),
            registry,
            menus,
            players: host,
            dispatcher: default_dispatcher(),
            writer: Arc::new(LocationWriter::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> JukeboxConfig {
        self.config.read().clone()
    }

    #[must_use]
    pub const fn registry(&self) -> &JukeboxRegistry {
        &self.registry
    }

    #[must_use]
    pub fn menus(&self) -> &MenuSyncBroadcaster {
        &self.menus
    }

    #[must_use]
    pub fn players(&self) -> &dyn Players {
        self.players.as_ref()
    }

    /// The location list, relative paths resolved next to the settings file.
    #[must_use]
    pub fn locations_path(&self) -> PathBuf {
        let file = self.config.read().locations_file.clone();
        match self.config_path.parent() {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file,
        }
    }

    /// Registers every saved jukebox. A broken file counts as empty.
    pub fn load_jukeboxes(&self) -> usize {
        let saved = SavedLocations::load_or_default(&self.locations_path());
        let loaded = self.registry.load(saved.locations);
        log::info!("Loaded {loaded} jukeboxes");
        loaded
    }

    /// Writes the current location list. The snapshot is taken right away,
    /// the write happens when the future is polled and is dropped if a newer
    /// snapshot made it to disk first.
    pub fn save_jukeboxes(&self) -> impl Future<Output = Result<(), ConfigError>> + Send + 'static {
        let (version, saved) = self.writer.snapshot(|| SavedLocations {
            locations: self.registry.locations(),
        });
        let path = self.locations_path();
        let writer = self.writer.clone();
        async move { writer.write(version, saved, path).await }
    }

    /// Saves in the background without holding up the caller.
    pub fn schedule_save(&self) {
        let Ok(runtime) = Handle::try_current() else {
            log::warn!("No runtime to save jukeboxes on, changes are kept in memory only");
            return;
        };
        let save = self.save_jukeboxes();
        runtime.spawn(async move {
            if let Err(err) = save.await {
                log::warn!("Couldn't save jukeboxes: {err}");
            }
        });
    }

    /// Reads the settings file again. Jukeboxes placed from now on use the
    /// new values.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = JukeboxConfig::load(&self.config_path)?;
        self.registry.set_settings(JukeboxSettings::from(&config));
        *self.config.write() = config;
        log::info!("Reloaded {}", self.config_path.display());
        Ok(())
    }

    pub async fn handle_command(&self, sender: &CommandSender, line: &str) {
        self.dispatcher.handle_command(sender, self, line).await;
    }

    #[must_use]
    pub fn command_help(&self, sender: &CommandSender) -> Vec<String> {
        self.dispatcher.help(sender)
    }

    #[must_use]
    pub fn placeholder(&self, requester: Option<&Actor>, params: &str) -> Option<String> {
        placeholder::resolve(&self.registry, requester, params)
    }

    /// Silences every jukebox and writes the location list one last time.
    pub async fn shutdown(&self) -> Result<(), ConfigError> {
        let save = self.save_jukeboxes();
        let destroyed = self.registry.destroy_all();
        log::info!("Stopped {destroyed} jukeboxes");
        save.await
    }

    #[must_use]
    pub fn settings_path(&self) -> &Path {
        &self.config_path
    }
}
