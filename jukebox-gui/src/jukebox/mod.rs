use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use jukebox_config::JukeboxConfig;
use jukebox_core::{Location, TrackCatalog, TrackId};
use jukebox_inventory::{MenuId, PlaybackSnapshot};
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use uuid::Uuid;

use crate::cooldown::CooldownTracker;
use crate::error::JukeboxError;
use crate::host::WorldAudio;
use crate::timer::{PlaybackTimer, Tick, TimerHandle, TimerId};

mod registry;

pub use registry::{JukeboxRegistry, RegistryError};

/// The part of the settings a jukebox is built with.
#[derive(Clone, Debug)]
pub struct JukeboxSettings {
    pub cooldown: Duration,
    pub volume: f32,
    pub note_interval: Duration,
    pub menu_title: String,
    pub catalog: TrackCatalog,
}

impl Default for JukeboxSettings {
    fn default() -> Self {
        Self::from(&JukeboxConfig::default())
    }
}

impl From<&JukeboxConfig> for JukeboxSettings {
    fn from(config: &JukeboxConfig) -> Self {
        Self {
            cooldown: config.cooldown(),
            volume: config.volume,
            note_interval: config.note_interval(),
            menu_title: config.menu_title.clone(),
            catalog: config.catalog(),
        }
    }
}

/// Told about every state change of a jukebox.
pub trait TransitionListener: Send + Sync {
    /// The jukebox started or stopped playing.
    fn refresh(&self, jukebox: &Jukebox);

    /// The jukebox was destroyed.
    fn release(&self, jukebox: &Jukebox);
}

static GENERATIONS: AtomicU64 = AtomicU64::new(0);

/// Unique across all jukeboxes, so a menu id reused by a new jukebox never
/// looks older than the one it replaces.
fn next_generation() -> u64 {
    GENERATIONS.fetch_add(1, Ordering::Relaxed) + 1
}

#[derive(Default)]
struct Playback {
    current: Option<TrackId>,
    last_selected_by: Option<String>,
    /// Set exactly when `current` is.
    timer: Option<TimerHandle>,
    destroyed: bool,
    generation: u64,
}

/// One placed jukebox and what it is playing.
///
/// All transitions run under the jukebox's own lock; listeners are notified
/// after it is released. Menu updates of one jukebox are serialized by a
/// second, reentrant lock that is never taken while the first is held.
pub struct Jukebox {
    location: Location,
    menu_id: MenuId,
    settings: Arc<JukeboxSettings>,
    limiter: CooldownTracker<Uuid>,
    playback: Mutex<Playback>,
    menus: ReentrantMutex<()>,
    timer: PlaybackTimer,
    audio: Arc<dyn WorldAudio>,
    listener: Arc<dyn TransitionListener>,
    me: Weak<Jukebox>,
}

impl Jukebox {
    pub fn new(
        location: Location,
        settings: Arc<JukeboxSettings>,
        timer: PlaybackTimer,
        audio: Arc<dyn WorldAudio>,
        listener: Arc<dyn TransitionListener>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            menu_id: MenuId::for_location(&location),
            location,
            limiter: CooldownTracker::new(settings.cooldown),
            settings,
            playback: Mutex::new(Playback {
                generation: next_generation(),
                ..Playback::default()
            }),
            menus: ReentrantMutex::new(()),
            timer,
            audio,
            listener,
            me: me.clone(),
        })
    }

    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub const fn menu_id(&self) -> &MenuId {
        &self.menu_id
    }

    #[must_use]
    pub fn settings(&self) -> &JukeboxSettings {
        &self.settings
    }

    /// Play/stop rate limit of this jukebox, keyed by player.
    #[must_use]
    pub const fn limiter(&self) -> &CooldownTracker<Uuid> {
        &self.limiter
    }

    #[must_use]
    pub fn current_track(&self) -> Option<TrackId> {
        self.playback.lock().current.clone()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playback.lock().current.is_some()
    }

    #[must_use]
    pub fn last_selected_by(&self) -> Option<String> {
        self.playback.lock().last_selected_by.clone()
    }

    #[must_use]
    pub fn has_timer(&self) -> bool {
        self.playback.lock().timer.is_some()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.playback.lock().destroyed
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.playback.lock().generation
    }

    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let playback = self.playback.lock();
        PlaybackSnapshot {
            current: playback.current.clone(),
            last_selected_by: playback.last_selected_by.clone(),
            generation: playback.generation,
        }
    }

    /// Held while menus of this jukebox are rendered and shown. The same
    /// thread may take it again, e.g. when a menu sink starts a song.
    pub fn lock_menus(&self) -> ReentrantMutexGuard<'_, ()> {
        self.menus.lock()
    }

    /// Starts `track`, cutting off whatever was playing.
    pub fn play(&self, track: TrackId, selected_by: Option<&str>) {
        {
            let mut playback = self.playback.lock();
            if playback.destroyed {
                log::debug!("Ignoring play on destroyed jukebox at {}", self.location);
                return;
            }
            self.start(&mut playback, track, selected_by);
        }
        self.listener.refresh(self);
    }

    /// Starts `track` only if nothing is playing yet.
    pub fn play_if_idle(&self, track: TrackId, selected_by: Option<&str>) -> bool {
        {
            let mut playback = self.playback.lock();
            if playback.destroyed || playback.current.is_some() {
                return false;
            }
            self.start(&mut playback, track, selected_by);
        }
        self.listener.refresh(self);
        true
    }

    pub fn stop(&self) {
        let stopped = {
            let mut playback = self.playback.lock();
            self.halt(&mut playback)
        };
        if stopped {
            self.listener.refresh(self);
        }
    }

    /// Stops playback for good and drops the cooldowns. Later calls are no-ops.
    pub fn destroy(&self) {
        {
            let mut playback = self.playback.lock();
            if playback.destroyed {
                return;
            }
            playback.destroyed = true;
            playback.generation = next_generation();
            self.halt(&mut playback);
        }
        self.limiter.unregister();
        self.listener.release(self);
    }

    /// Timer callback. A timer that was replaced after it started firing
    /// finds a different id in place and leaves the new song alone.
    fn expire(&self, timer: TimerId) {
        let stopped = {
            let mut playback = self.playback.lock();
            if playback.timer.as_ref().map(TimerHandle::id) == Some(timer) {
                self.halt(&mut playback)
            } else {
                log::debug!("Stale timer {timer} for jukebox at {}", self.location);
                false
            }
        };
        if stopped {
            self.listener.refresh(self);
        }
    }

    fn start(&self, playback: &mut Playback, track: TrackId, selected_by: Option<&str>) {
        self.halt(playback);

        let duration = self.settings.catalog.duration(&track);
        let on_expire = {
            let me = self.me.clone();
            move |id| {
                if let Some(jukebox) = me.upgrade() {
                    jukebox.expire(id);
                }
            }
        };
        let notes = {
            let me = self.me.clone();
            Tick::new(self.settings.note_interval, move || {
                if let Some(jukebox) = me.upgrade() {
                    jukebox.audio.spawn_notes(&jukebox.location);
                }
            })
        };

        match self.timer.start(duration, on_expire, Some(notes)) {
            Ok(timer) => {
                self.audio
                    .play_record(&self.location, &track, self.settings.volume);
                log::debug!(
                    "Jukebox at {} playing {track} for {}s",
                    self.location,
                    duration.as_secs()
                );
                playback.current = Some(track);
                playback.last_selected_by = selected_by.map(str::to_owned);
                playback.timer = Some(timer);
                playback.generation = next_generation();
            }
            Err(err) => err.log(),
        }
    }

    /// Cancels the timer and clears the track. Returns whether anything was playing.
    fn halt(&self, playback: &mut Playback) -> bool {
        let Some(track) = playback.current.take() else {
            return false;
        };
        if let Some(timer) = playback.timer.take() {
            timer.cancel();
        }
        self.audio.stop_record(&self.location, &track);
        playback.generation = next_generation();
        true
    }
}
