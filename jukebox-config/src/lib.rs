use std::{
    collections::HashMap,
    fs,
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

use jukebox_core::{Location, TrackCatalog};
use log::warn;
use logging::LoggingConfig;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

mod error;
pub mod logging;

pub use error::ConfigError;

pub const SETTINGS_FILE: &str = "jukebox.toml";

/// Settings of the jukebox plugin.
///
/// Everything has a default so an empty or partial file still loads.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct JukeboxConfig {
    /// How long a player has to wait between two play/stop clicks on the same jukebox.
    pub cooldown_secs: u64,
    /// Volume records are played at.
    pub volume: f32,
    /// Interval of the note particle pulse while a song plays.
    pub note_interval_ms: u64,
    /// Length assumed for songs missing from the duration table.
    pub default_track_secs: u64,
    /// Per-song length overrides keyed by short name (`cat`, `13`, ...).
    pub track_durations: HashMap<String, u64>,
    /// Title of the song picker menu.
    pub menu_title: String,
    /// Where the list of jukebox locations is kept.
    pub locations_file: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for JukeboxConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 30,
            volume: 0.5,
            note_interval_ms: 1000,
            default_track_secs: 180,
            track_durations: HashMap::new(),
            menu_title: "Jukebox".to_string(),
            locations_file: PathBuf::from("jukeboxes.json"),
            logging: LoggingConfig::default(),
        }
    }
}

impl JukeboxConfig {
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    #[must_use]
    pub const fn note_interval(&self) -> Duration {
        Duration::from_millis(self.note_interval_ms)
    }

    /// The vanilla discs with this file's duration overrides applied.
    #[must_use]
    pub fn catalog(&self) -> TrackCatalog {
        self.track_durations.iter().fold(
            TrackCatalog::vanilla()
                .with_default_duration(Duration::from_secs(self.default_track_secs)),
            |catalog, (name, secs)| catalog.with_duration(name.clone(), Duration::from_secs(*secs)),
        )
    }
}

pub trait LoadTomlConfiguration {
    /// Reads the file at `path`, writing the defaults there first if it is missing.
    fn load(path: &Path) -> Result<Self, ConfigError>
    where
        Self: Sized + Default + Serialize + DeserializeOwned,
    {
        let config = if path.exists() {
            let file_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            toml::from_str(&file_content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            let content = Self::default();

            if let Err(err) = fs::write(path, toml::to_string(&content)?) {
                warn!("Couldn't write default config to {path:?}. Reason: {err}");
            }

            content
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError>;
}

impl LoadTomlConfiguration for JukeboxConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Invalid(format!(
                "volume must be between 0 and 1, got {}",
                self.volume
            )));
        }
        if self.note_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "note_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

pub trait LoadJSONConfiguration {
    fn load(path: &Path) -> Result<Self, ConfigError>
    where
        Self: Sized + Default + for<'de> Deserialize<'de>,
    {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if file_content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&file_content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`LoadJSONConfiguration::load`] but never fails: unreadable files
    /// are logged and treated as empty.
    fn load_or_default(path: &Path) -> Self
    where
        Self: Sized + Default + for<'de> Deserialize<'de>,
    {
        Self::load(path).unwrap_or_else(|err| {
            warn!("{err}. Starting without saved data");
            Self::default()
        })
    }
}

pub trait SaveJSONConfiguration: LoadJSONConfiguration + Serialize {
    /// Writes next to `path` first and renames over it, so readers see
    /// either the old file or the new one.
    fn save(&self, path: PathBuf) -> impl Future<Output = Result<(), ConfigError>> + Send {
        let content = serde_json::to_string_pretty(self);
        async move {
            let content = content?;
            let tmp = temp_path(&path);
            if let Err(source) = tokio::fs::write(&tmp, content).await {
                return Err(ConfigError::Io { path: tmp, source });
            }
            if let Err(source) = tokio::fs::rename(&tmp, &path).await {
                let _ = tokio::fs::remove_file(&tmp).await;
                return Err(ConfigError::Io { path, source });
            }
            Ok(())
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// The persisted jukebox locations. Playback state is never saved.
#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct SavedLocations {
    pub locations: Vec<Location>,
}

impl LoadJSONConfiguration for SavedLocations {}

impl SaveJSONConfiguration for SavedLocations {}
