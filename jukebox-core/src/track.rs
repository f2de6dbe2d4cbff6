use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DISC_PREFIX: &str = "music_disc.";

/// Fallback length for songs missing from the duration table.
pub const DEFAULT_TRACK_DURATION: Duration = Duration::from_secs(3 * 60);

/// A selectable song, identified by its namespaced sound key
/// (`minecraft:music_disc.cat`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Keys without a namespace land in `minecraft`.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        if key.contains(':') {
            Self(key)
        } else {
            Self(format!("minecraft:{key}"))
        }
    }

    /// The vanilla disc called `name` (`"cat"` -> `minecraft:music_disc.cat`).
    #[must_use]
    pub fn disc(name: &str) -> Self {
        Self(format!("minecraft:{DISC_PREFIX}{name}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map_or("minecraft", |(namespace, _)| namespace)
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, path)| path)
    }

    /// The key used by the duration table: the disc name without its prefix.
    #[must_use]
    pub fn short_name(&self) -> &str {
        let path = self.path();
        path.strip_prefix(DISC_PREFIX).unwrap_or(path)
    }

    /// The disc item for this song, if the song is a disc at all.
    #[must_use]
    pub fn item_key(&self) -> Option<String> {
        let path = self.path();
        path.starts_with(DISC_PREFIX)
            .then(|| format!("{}:{}", self.namespace(), path.replace('.', "_")))
    }

    /// Translation key of the disc item's display name.
    #[must_use]
    pub fn item_translation_key(&self) -> String {
        format!("item.{}.{}", self.namespace(), self.path().replace('.', "_"))
    }

    /// Translation key describing the song itself.
    ///
    /// Clients from 1.21 on know `jukebox_song.*`; older ones only have the
    /// disc item's `.desc` line.
    #[must_use]
    pub fn song_translation_key(&self, legacy_client: bool) -> String {
        if legacy_client {
            format!("{}.desc", self.item_translation_key())
        } else {
            format!("jukebox_song.{}.{}", self.namespace(), self.short_name())
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in song lengths keyed by short name.
const VANILLA_DURATIONS: [(&str, u64); 18] = [
    ("5", 2 * 60 + 58),
    ("cat", 3 * 60 + 5),
    ("blocks", 5 * 60 + 45),
    ("chirp", 3 * 60 + 5),
    ("far", 2 * 60 + 54),
    ("mall", 3 * 60 + 17),
    ("mellohi", 60 + 36),
    ("stal", 2 * 60 + 30),
    ("strad", 3 * 60 + 8),
    ("ward", 4 * 60 + 11),
    ("11", 60 + 11),
    ("wait", 3 * 60 + 58),
    ("otherside", 3 * 60 + 15),
    ("pigstep", 2 * 60 + 28),
    ("relic", 3 * 60 + 38),
    ("creator", 2 * 60 + 56),
    ("creator_music_box", 60 + 13),
    ("precipice", 4 * 60 + 59),
];

const VANILLA_DISCS: [&str; 19] = [
    "11",
    "13",
    "5",
    "blocks",
    "cat",
    "chirp",
    "creator",
    "creator_music_box",
    "far",
    "mall",
    "mellohi",
    "otherside",
    "pigstep",
    "precipice",
    "relic",
    "stal",
    "strad",
    "wait",
    "ward",
];

/// The songs a jukebox menu offers and how long each one runs.
#[derive(Clone, Debug)]
pub struct TrackCatalog {
    tracks: Vec<TrackId>,
    durations: HashMap<String, Duration>,
    default_duration: Duration,
}

impl Default for TrackCatalog {
    fn default() -> Self {
        Self::vanilla()
    }
}

impl TrackCatalog {
    /// Every vanilla music disc with its real length.
    #[must_use]
    pub fn vanilla() -> Self {
        Self {
            tracks: VANILLA_DISCS.into_iter().map(TrackId::disc).collect(),
            durations: VANILLA_DURATIONS
                .into_iter()
                .map(|(name, secs)| (name.to_string(), Duration::from_secs(secs)))
                .collect(),
            default_duration: DEFAULT_TRACK_DURATION,
        }
    }

    #[must_use]
    pub fn new(tracks: Vec<TrackId>) -> Self {
        Self {
            tracks,
            durations: HashMap::new(),
            default_duration: DEFAULT_TRACK_DURATION,
        }
    }

    #[must_use]
    pub fn with_duration(mut self, short_name: impl Into<String>, duration: Duration) -> Self {
        self.durations.insert(short_name.into(), duration);
        self
    }

    #[must_use]
    pub const fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    #[must_use]
    pub fn tracks(&self) -> &[TrackId] {
        &self.tracks
    }

    #[must_use]
    pub fn duration(&self, track: &TrackId) -> Duration {
        self.durations
            .get(track.short_name())
            .copied()
            .unwrap_or(self.default_duration)
    }
}
