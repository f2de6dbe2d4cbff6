//! Keeps open jukebox menus in step with playback.

use std::sync::Arc;

use jukebox_core::Actor;
use jukebox_inventory::{render_menu, Menu, MenuError, ViewerRegistry};
use uuid::Uuid;

use crate::host::MenuSink;
use crate::jukebox::{Jukebox, TransitionListener};

pub struct MenuSyncBroadcaster {
    viewers: Arc<ViewerRegistry>,
    sink: Arc<dyn MenuSink>,
}

impl MenuSyncBroadcaster {
    pub fn new(viewers: Arc<ViewerRegistry>, sink: Arc<dyn MenuSink>) -> Self {
        Self { viewers, sink }
    }

    #[must_use]
    pub fn viewers(&self) -> &ViewerRegistry {
        &self.viewers
    }

    /// Renders the menu of `jukebox` as `viewer` is allowed to see it.
    #[must_use]
    pub fn render(jukebox: &Jukebox, viewer: &Actor) -> Menu {
        let settings = jukebox.settings();
        render_menu(
            jukebox.location(),
            &settings.menu_title,
            &settings.catalog,
            &jukebox.snapshot(),
            &viewer.permissions,
        )
    }

    /// Opens the menu of `jukebox` for `viewer`.
    ///
    /// The viewer is registered before the menu is shown so a change in
    /// between refreshes them too; the menu is shown again until it matches
    /// the playback state.
    pub fn open(&self, viewer: &Actor, jukebox: &Jukebox) -> Result<(), MenuError> {
        let _menus = jukebox.lock_menus();
        if jukebox.is_destroyed() {
            log::debug!("Not opening {} of a removed jukebox", jukebox.menu_id());
            return Ok(());
        }

        let mut menu = Self::render(jukebox, viewer);
        self.viewers.open(viewer.clone(), menu.clone());
        loop {
            if let Err(err) = self.sink.show(viewer, &menu) {
                self.viewers.close(viewer.uuid);
                return Err(err);
            }
            if jukebox.generation() == menu.generation {
                self.viewers.replace(viewer.uuid, menu);
                return Ok(());
            }
            menu = Self::render(jukebox, viewer);
        }
    }

    /// Closes whatever menu `viewer` has open.
    pub fn close(&self, viewer: Uuid) {
        if self.viewers.close(viewer).is_some() {
            self.sink.close(viewer);
        }
    }

    /// Re-renders the menu for everyone looking at `jukebox`. Returns how
    /// many viewers got the new menu.
    pub fn refresh(&self, jukebox: &Jukebox) -> usize {
        let _menus = jukebox.lock_menus();
        self.viewers
            .viewers_of(jukebox.menu_id())
            .into_iter()
            .filter(|open| self.refresh_viewer(jukebox, &open.viewer))
            .count()
    }

    fn refresh_viewer(&self, jukebox: &Jukebox, viewer: &Actor) -> bool {
        loop {
            let still_open = self
                .viewers
                .current(viewer.uuid)
                .is_some_and(|open| &open.menu.id == jukebox.menu_id());
            if !still_open {
                return false;
            }

            let menu = Self::render(jukebox, viewer);
            if let Err(err) = self.sink.show(viewer, &menu) {
                log::warn!(
                    "Couldn't refresh {} for {}: {err}",
                    jukebox.menu_id(),
                    viewer.name
                );
                return false;
            }
            if jukebox.generation() == menu.generation {
                return self.viewers.replace(viewer.uuid, menu);
            }
        }
    }
}

impl TransitionListener for MenuSyncBroadcaster {
    fn refresh(&self, jukebox: &Jukebox) {
        let refreshed = MenuSyncBroadcaster::refresh(self, jukebox);
        log::debug!("Refreshed {refreshed} menus of {}", jukebox.menu_id());
    }

    fn release(&self, jukebox: &Jukebox) {
        let _menus = jukebox.lock_menus();
        for viewer in self.viewers.close_all(jukebox.menu_id()) {
            self.sink.close(viewer);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{OnceLock, Weak};
    use std::time::Duration;

    use jukebox_core::{Location, PermissionSet, TrackId};
    use jukebox_inventory::ClickAction;

    use super::*;
    use crate::host::testing::{HostEvent, RecordingHost};
    use crate::jukebox::{JukeboxRegistry, JukeboxSettings};
    use crate::timer::PlaybackTimer;

    /// Lets the registry be built before the broadcaster it notifies.
    #[derive(Default)]
    struct Deferred(OnceLock<Arc<MenuSyncBroadcaster>>);

    impl TransitionListener for Deferred {
        fn refresh(&self, jukebox: &Jukebox) {
            if let Some(menus) = self.0.get() {
                TransitionListener::refresh(menus.as_ref(), jukebox);
            }
        }

        fn release(&self, jukebox: &Jukebox) {
            if let Some(menus) = self.0.get() {
                menus.release(jukebox);
            }
        }
    }

    /// Starts a song from inside its first `show`, before recording it.
    struct PlaysWhileShowing {
        host: Arc<RecordingHost>,
        jukebox: OnceLock<Weak<Jukebox>>,
        played: AtomicBool,
    }

    impl MenuSink for PlaysWhileShowing {
        fn show(&self, viewer: &Actor, menu: &Menu) -> Result<(), MenuError> {
            if !self.played.swap(true, Ordering::SeqCst) {
                if let Some(jukebox) = self.jukebox.get().and_then(Weak::upgrade) {
                    jukebox.play(TrackId::disc("cat"), Some(&viewer.name));
                }
            }
            self.host.show(viewer, menu)
        }

        fn close(&self, viewer: Uuid) {
            self.host.close(viewer);
        }
    }

    struct Fixture {
        host: Arc<RecordingHost>,
        menus: Arc<MenuSyncBroadcaster>,
        registry: JukeboxRegistry,
    }

    fn fixture() -> Fixture {
        let host = Arc::new(RecordingHost::default());
        let menus = Arc::new(MenuSyncBroadcaster::new(
            Arc::new(ViewerRegistry::new()),
            host.clone(),
        ));
        let deferred = Arc::new(Deferred::default());
        let _ = deferred.0.set(menus.clone());
        let registry = JukeboxRegistry::new(
            JukeboxSettings::default(),
            PlaybackTimer::current(),
            host.clone(),
            deferred,
        );
        Fixture {
            host,
            menus,
            registry,
        }
    }

    fn player(name: &str) -> Actor {
        Actor::new(Uuid::new_v4(), name, "world").with_permissions(PermissionSet::all())
    }

    fn first() -> Location {
        Location::new("world", 0, 64, 0)
    }

    fn second() -> Location {
        Location::new("world", 8, 64, 0)
    }

    #[tokio::test(start_paused = true)]
    async fn play_refreshes_only_matching_viewers() {
        let Fixture {
            host,
            menus,
            registry,
        } = fixture();
        let jukebox = registry.create(first()).unwrap();
        let other = registry.create(second()).unwrap();
        let (alex, steve, notch) = (player("Alex"), player("Steve"), player("Notch"));
        menus.open(&alex, &jukebox).unwrap();
        menus.open(&steve, &jukebox).unwrap();
        menus.open(&notch, &other).unwrap();
        let notch_before = menus.viewers().current(notch.uuid).unwrap().menu;
        host.take();

        jukebox.play(TrackId::disc("cat"), Some("Alex"));

        assert_eq!(host.shown_to(alex.uuid).len(), 1);
        assert_eq!(host.shown_to(steve.uuid).len(), 1);
        assert!(host.shown_to(notch.uuid).is_empty());
        assert_eq!(
            menus.viewers().current(notch.uuid).unwrap().menu,
            notch_before
        );

        let menu = menus.viewers().current(alex.uuid).unwrap().menu;
        assert!(menu.cells().any(|(_, cell)| cell.glowing));
        assert_eq!(menu.action(49), Some(&ClickAction::Stop));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_viewer_does_not_block_others() {
        let Fixture {
            host,
            menus,
            registry,
        } = fixture();
        let jukebox = registry.create(first()).unwrap();
        let (alex, steve) = (player("Alex"), player("Steve"));
        menus.open(&alex, &jukebox).unwrap();
        menus.open(&steve, &jukebox).unwrap();
        host.failing.lock().push(alex.uuid);

        assert_eq!(menus.refresh(&jukebox), 1);
        assert_eq!(host.shown_to(steve.uuid).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn viewer_permissions_shape_their_menu() {
        let Fixture {
            menus, registry, ..
        } = fixture();
        let jukebox = registry.create(first()).unwrap();
        let guest = Actor::new(Uuid::new_v4(), "Guest", "world");
        menus.open(&guest, &jukebox).unwrap();
        jukebox.play(TrackId::disc("cat"), None);

        let menu = menus.viewers().current(guest.uuid).unwrap().menu;
        assert!(menu.cells().all(|(_, cell)| cell.action != Some(ClickAction::Stop)));
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_refreshes_viewers() {
        let Fixture {
            host,
            menus,
            registry,
        } = fixture();
        let jukebox = registry.create(first()).unwrap();
        let alex = player("Alex");
        menus.open(&alex, &jukebox).unwrap();
        jukebox.play(TrackId::disc("cat"), None);
        host.take();

        tokio::time::sleep(Duration::from_secs(186)).await;
        assert_eq!(host.shown_to(alex.uuid).len(), 1);
        let menu = menus.viewers().current(alex.uuid).unwrap().menu;
        assert!(menu.cells().all(|(_, cell)| !cell.glowing));
    }

    #[tokio::test]
    async fn destroy_closes_viewers() {
        let Fixture {
            host,
            menus,
            registry,
        } = fixture();
        let jukebox = registry.create(first()).unwrap();
        let other = registry.create(second()).unwrap();
        let (alex, notch) = (player("Alex"), player("Notch"));
        menus.open(&alex, &jukebox).unwrap();
        menus.open(&notch, &other).unwrap();

        registry.remove(&first()).unwrap().destroy();

        assert!(host.take().contains(&HostEvent::Close(alex.uuid)));
        assert!(menus.viewers().current(alex.uuid).is_none());
        assert!(menus.viewers().current(notch.uuid).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn song_started_while_opening_ends_up_on_screen() {
        let host = Arc::new(RecordingHost::default());
        let sink = Arc::new(PlaysWhileShowing {
            host: host.clone(),
            jukebox: OnceLock::new(),
            played: AtomicBool::new(false),
        });
        let menus = Arc::new(MenuSyncBroadcaster::new(
            Arc::new(ViewerRegistry::new()),
            sink.clone(),
        ));
        let deferred = Arc::new(Deferred::default());
        let _ = deferred.0.set(menus.clone());
        let registry = JukeboxRegistry::new(
            JukeboxSettings::default(),
            PlaybackTimer::current(),
            host.clone(),
            deferred,
        );
        let jukebox = registry.create(first()).unwrap();
        let _ = sink.jukebox.set(Arc::downgrade(&jukebox));
        let alex = player("Alex");

        menus.open(&alex, &jukebox).unwrap();

        assert!(jukebox.is_playing());
        let shown = host.shown_to(alex.uuid);
        let last = shown.last().unwrap();
        assert_eq!(last.action(49), Some(&ClickAction::Stop));
        assert_eq!(last.generation, jukebox.generation());
        assert_eq!(&menus.viewers().current(alex.uuid).unwrap().menu, last);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn menus_settle_on_the_final_state() {
        for _ in 0..10 {
            let Fixture {
                host,
                menus,
                registry,
            } = fixture();
            let jukebox = registry.create(first()).unwrap();
            let viewers: Vec<Actor> = (0..6).map(|i| player(&format!("Viewer{i}"))).collect();

            let opens = viewers.iter().cloned().map(|viewer| {
                let (menus, jukebox) = (menus.clone(), jukebox.clone());
                tokio::spawn(async move { menus.open(&viewer, &jukebox).unwrap() })
            });
            let changes = (0..12).map(|i| {
                let jukebox = jukebox.clone();
                tokio::spawn(async move {
                    if i % 2 == 0 {
                        jukebox.play(TrackId::disc("cat"), None);
                    } else {
                        jukebox.stop();
                    }
                })
            });
            let tasks: Vec<_> = opens.chain(changes).collect();
            for task in tasks {
                task.await.unwrap();
            }

            let generation = jukebox.generation();
            for viewer in &viewers {
                let stored = menus.viewers().current(viewer.uuid).unwrap().menu;
                assert_eq!(stored.generation, generation);
                assert_eq!(host.shown_to(viewer.uuid).last(), Some(&stored));
            }
        }
    }
}
