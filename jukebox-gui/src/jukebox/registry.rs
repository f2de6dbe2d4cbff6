use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use jukebox_core::{Location, TrackId};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use super::{Jukebox, JukeboxSettings, TransitionListener};
use crate::host::WorldAudio;
use crate::timer::PlaybackTimer;

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("There is already a jukebox at {0}")]
    AlreadyExists(Location),
}

/// Every placed jukebox, keyed by location.
///
/// The map lock is never held while a jukebox transitions.
pub struct JukeboxRegistry {
    jukeboxes: Mutex<HashMap<Location, Arc<Jukebox>>>,
    settings: RwLock<Arc<JukeboxSettings>>,
    timer: PlaybackTimer,
    audio: Arc<dyn WorldAudio>,
    listener: Arc<dyn TransitionListener>,
}

impl JukeboxRegistry {
    pub fn new(
        settings: JukeboxSettings,
        timer: PlaybackTimer,
        audio: Arc<dyn WorldAudio>,
        listener: Arc<dyn TransitionListener>,
    ) -> Self {
        Self {
            jukeboxes: Mutex::new(HashMap::new()),
            settings: RwLock::new(Arc::new(settings)),
            timer,
            audio,
            listener,
        }
    }

    /// Registers an idle jukebox at `location`.
    pub fn create(&self, location: Location) -> Result<Arc<Jukebox>, RegistryError> {
        let mut jukeboxes = self.jukeboxes.lock();
        if jukeboxes.contains_key(&location) {
            return Err(RegistryError::AlreadyExists(location));
        }
        let jukebox = Jukebox::new(
            location.clone(),
            self.settings(),
            self.timer.clone(),
            self.audio.clone(),
            self.listener.clone(),
        );
        jukeboxes.insert(location, jukebox.clone());
        Ok(jukebox)
    }

    #[must_use]
    pub fn get(&self, location: &Location) -> Option<Arc<Jukebox>> {
        self.jukeboxes.lock().get(location).cloned()
    }

    /// Unregisters the jukebox at `location`. The caller destroys it.
    pub fn remove(&self, location: &Location) -> Option<Arc<Jukebox>> {
        self.jukeboxes.lock().remove(location)
    }

    #[must_use]
    pub fn contains(&self, location: &Location) -> bool {
        self.jukeboxes.lock().contains_key(location)
    }

    #[must_use]
    pub fn all(&self) -> Vec<(Location, Arc<Jukebox>)> {
        self.jukeboxes
            .lock()
            .iter()
            .map(|(location, jukebox)| (location.clone(), jukebox.clone()))
            .collect()
    }

    /// Registered locations in a stable order, as they are saved.
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        let mut locations: Vec<_> = self.jukeboxes.lock().keys().cloned().collect();
        locations.sort_by(|a, b| {
            (&a.world, a.x(), a.y(), a.z()).cmp(&(&b.world, b.x(), b.y(), b.z()))
        });
        locations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jukeboxes.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jukeboxes.lock().is_empty()
    }

    /// Creates a jukebox for every saved location. Duplicates are skipped.
    pub fn load(&self, locations: impl IntoIterator<Item = Location>) -> usize {
        locations
            .into_iter()
            .filter(|location| match self.create(location.clone()) {
                Ok(_) => true,
                Err(err) => {
                    log::warn!("Skipping saved jukebox: {err}");
                    false
                }
            })
            .count()
    }

    /// Settings handed to jukeboxes created from now on.
    #[must_use]
    pub fn settings(&self) -> Arc<JukeboxSettings> {
        self.settings.read().clone()
    }

    pub fn set_settings(&self, settings: JukeboxSettings) {
        *self.settings.write() = Arc::new(settings);
    }

    /// Removes and destroys every jukebox.
    pub fn destroy_all(&self) -> usize {
        let removed: Vec<_> = self.jukeboxes.lock().drain().map(|(_, j)| j).collect();
        for jukebox in &removed {
            jukebox.destroy();
        }
        removed.len()
    }

    #[must_use]
    pub fn now_playing(&self, location: &Location) -> Option<TrackId> {
        self.get(location)?.current_track()
    }

    /// `None` if there is no jukebox at `location`.
    #[must_use]
    pub fn cooldown_remaining(&self, location: &Location, actor: Uuid) -> Option<Duration> {
        Some(self.get(location)?.limiter().remaining_wait(&actor))
    }
}

#[cfg(test)]
mod tests {
    use jukebox_core::TrackCatalog;

    use super::*;
    use crate::host::testing::RecordingHost;

    struct Quiet;

    impl TransitionListener for Quiet {
        fn refresh(&self, _jukebox: &Jukebox) {}

        fn release(&self, _jukebox: &Jukebox) {}
    }

    fn registry() -> JukeboxRegistry {
        let settings = JukeboxSettings {
            catalog: TrackCatalog::vanilla()
                .with_duration("cat", Duration::from_secs(5))
                .with_duration("far", Duration::from_secs(60)),
            ..JukeboxSettings::default()
        };
        JukeboxRegistry::new(
            settings,
            PlaybackTimer::current(),
            Arc::new(RecordingHost::default()),
            Arc::new(Quiet),
        )
    }

    fn here() -> Location {
        Location::new("world", 10, 64, -3)
    }

    #[tokio::test]
    async fn create_rejects_occupied_location() {
        let registry = registry();
        registry.create(here()).unwrap();
        assert!(matches!(
            registry.create(here()),
            Err(RegistryError::AlreadyExists(location)) if location == here()
        ));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn song_stops_by_itself() {
        let registry = registry();
        registry.create(here()).unwrap();
        registry.get(&here()).unwrap().play(TrackId::disc("cat"), None);
        assert_eq!(registry.now_playing(&here()), Some(TrackId::disc("cat")));

        tokio::time::sleep(Duration::from_secs(5) + Duration::from_millis(1)).await;
        assert_eq!(registry.get(&here()).unwrap().current_track(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn second_song_is_not_cut_by_first_timer() {
        let registry = registry();
        let jukebox = registry.create(here()).unwrap();
        jukebox.play(TrackId::disc("cat"), None);
        jukebox.play(TrackId::disc("far"), None);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(registry.now_playing(&here()), Some(TrackId::disc("far")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn removed_location_stays_gone() {
        for _ in 0..50 {
            let registry = Arc::new(registry());
            let jukebox = registry.create(here()).unwrap();

            let player = {
                let registry = registry.clone();
                tokio::spawn(async move {
                    if let Some(jukebox) = registry.get(&here()) {
                        jukebox.play(TrackId::disc("far"), Some("Alex"));
                    }
                })
            };
            let removed = registry.remove(&here());
            if let Some(removed) = removed {
                removed.destroy();
            }
            player.await.unwrap();

            assert!(registry.get(&here()).is_none());
            assert!(!jukebox.is_playing());
            assert!(!jukebox.has_timer());
        }
    }

    #[tokio::test]
    async fn load_skips_duplicates() {
        let registry = registry();
        let other = Location::new("world_nether", 0, 0, 0);
        assert_eq!(registry.load([here(), other.clone(), here()]), 2);
        assert_eq!(registry.locations(), vec![here(), other]);
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_all_silences_everything() {
        let registry = registry();
        registry.load([here(), Location::new("world", 0, 0, 0)]);
        for (_, jukebox) in registry.all() {
            jukebox.play(TrackId::disc("far"), None);
        }
        let jukeboxes = registry.all();

        assert_eq!(registry.destroy_all(), 2);
        assert!(registry.is_empty());
        assert!(jukeboxes.iter().all(|(_, jukebox)| jukebox.is_destroyed()));
        assert!(jukeboxes.iter().all(|(_, jukebox)| !jukebox.has_timer()));
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_is_reported_per_location() {
        let registry = registry();
        let jukebox = registry.create(here()).unwrap();
        let actor = Uuid::new_v4();
        assert!(jukebox.limiter().test(actor));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(
            registry.cooldown_remaining(&here(), actor),
            Some(Duration::from_secs(20))
        );
        assert_eq!(
            registry.cooldown_remaining(&Location::new("world", 0, 0, 0), actor),
            None
        );
    }

    #[tokio::test]
    async fn new_settings_apply_to_new_jukeboxes() {
        let registry = registry();
        let old = registry.create(here()).unwrap();
        registry.set_settings(JukeboxSettings {
            cooldown: Duration::from_secs(5),
            ..JukeboxSettings::default()
        });
        let new = registry.create(Location::new("world", 0, 0, 0)).unwrap();

        assert_eq!(old.limiter().cooldown(), Duration::from_secs(30));
        assert_eq!(new.limiter().cooldown(), Duration::from_secs(5));
    }
}
