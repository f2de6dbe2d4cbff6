use jukebox_core::text::brand;
use jukebox_core::{Actor, Location, Permission};
use jukebox_inventory::{item::JUKEBOX_MATERIAL, ClickAction, ItemStack, JukeboxItem};
use uuid::Uuid;

use super::JukeboxPlugin;
use crate::error::JukeboxError;

/// Whether the host should go on with the vanilla behaviour of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    Cancel,
}

impl EventOutcome {
    #[must_use]
    pub const fn is_cancelled(self) -> bool {
        matches!(self, EventOutcome::Cancel)
    }
}

impl JukeboxPlugin {
    /// A block was placed with `item` in hand.
    pub fn on_block_place(&self, actor: &Actor, location: Location, item: &ItemStack) -> EventOutcome {
        if !JukeboxItem::is_item(item) {
            return EventOutcome::Continue;
        }
        if !actor.has_permission(Permission::Create) {
            return EventOutcome::Cancel;
        }

        match self.registry.create(location) {
            Ok(jukebox) => {
                log::info!("{} placed a jukebox at {}", actor.name, jukebox.location());
                self.players.send_message(actor.uuid, "&aPlaced a jukebox item!");
                self.schedule_save();
            }
            Err(err) => err.log(),
        }
        EventOutcome::Continue
    }

    /// Right click on a block. Jukeboxes never get their vanilla behaviour.
    pub fn on_interact(&self, actor: &Actor, location: &Location) -> EventOutcome {
        let Some(jukebox) = self.registry.get(location) else {
            return EventOutcome::Continue;
        };
        if actor.has_permission(Permission::OpenGui) {
            if let Err(err) = self.menus.open(actor, &jukebox) {
                err.log();
            }
        }
        EventOutcome::Cancel
    }

    /// A block was broken. Breaks that drop items are handled by
    /// [`JukeboxPlugin::on_block_drop_items`].
    pub fn on_block_break(&self, actor: &Actor, location: &Location, drops_items: bool) -> EventOutcome {
        if drops_items || !self.registry.contains(location) {
            return EventOutcome::Continue;
        }
        if !actor.has_permission(Permission::Delete) {
            return EventOutcome::Cancel;
        }
        self.remove_jukebox(actor, location);
        EventOutcome::Continue
    }

    /// A broken block is about to drop `items`. Jukebox drops are tagged so
    /// they can be placed again.
    pub fn on_block_drop_items(
        &self,
        actor: &Actor,
        location: &Location,
        items: &mut [ItemStack],
    ) -> EventOutcome {
        if !self.registry.contains(location) {
            return EventOutcome::Continue;
        }
        if !actor.has_permission(Permission::Delete) {
            return EventOutcome::Cancel;
        }
        if self.remove_jukebox(actor, location) {
            items
                .iter_mut()
                .filter(|item| item.item == JUKEBOX_MATERIAL)
                .for_each(JukeboxItem::tag_and_name_item);
        }
        EventOutcome::Continue
    }

    /// `actor` clicked `slot` of the menu they have open.
    pub fn on_menu_click(&self, actor: &Actor, slot: usize) {
        let Some(open) = self.menus.viewers().current(actor.uuid) else {
            return;
        };
        let Some(action) = open.menu.action(slot).cloned() else {
            return;
        };
        let Some(jukebox) = self.registry.get(&open.menu.location) else {
            self.menus.close(actor.uuid);
            return;
        };

        let permission = match action {
            ClickAction::Close => {
                self.menus.close(actor.uuid);
                return;
            }
            ClickAction::Stop => Permission::Stop,
            ClickAction::Play { .. } => Permission::Play,
        };
        if !actor.has_permission(permission) {
            return;
        }
        if !jukebox.limiter().test(actor.uuid) {
            self.players.send_message(
                actor.uuid,
                &brand("<error>Please wait before doing that again."),
            );
            return;
        }

        self.menus.close(actor.uuid);
        match action {
            ClickAction::Play {
                track,
                replace: true,
            } => jukebox.play(track, Some(&actor.name)),
            ClickAction::Play {
                track,
                replace: false,
            } => {
                if !jukebox.play_if_idle(track, Some(&actor.name)) {
                    self.players
                        .send_message(actor.uuid, &brand("<error>Something is already playing."));
                }
            }
            ClickAction::Stop => jukebox.stop(),
            ClickAction::Close => {}
        }
    }

    /// The host closed a menu on its own (escape key, logout).
    pub fn on_menu_close(&self, viewer: Uuid) {
        self.menus.viewers().close(viewer);
    }

    fn remove_jukebox(&self, actor: &Actor, location: &Location) -> bool {
        let Some(jukebox) = self.registry.remove(location) else {
            return false;
        };
        jukebox.destroy();
        log::info!("{} removed the jukebox at {location}", actor.name);
        self.players.send_message(actor.uuid, "&cRemoved a jukebox item");
        self.schedule_save();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jukebox_core::{PermissionSet, TrackId};

    use super::*;
    use crate::host::testing::HostEvent;
    use crate::plugin::tests::{fixture, player, Fixture};

    fn here() -> Location {
        Location::new("world", 3, 64, 3)
    }

    /// Slot of `track` in a freshly rendered menu.
    fn slot_of(plugin: &JukeboxPlugin, actor: &Actor, track: &TrackId) -> usize {
        let open = plugin.menus().viewers().current(actor.uuid).unwrap();
        let slot = open
            .menu
            .cells()
            .find(|(_, cell)| {
                matches!(&cell.action, Some(ClickAction::Play { track: t, .. }) if t == track)
            })
            .map(|(slot, _)| slot)
            .unwrap();
        slot
    }

    #[tokio::test]
    async fn placing_the_item_creates_a_jukebox() {
        let Fixture {
            dir: _dir,
            host,
            plugin,
        } = fixture();
        let alex = player("Alex");

        let plain = ItemStack::new(JUKEBOX_MATERIAL);
        assert_eq!(plugin.on_block_place(&alex, here(), &plain), EventOutcome::Continue);
        assert!(!plugin.registry().contains(&here()));

        let outcome = plugin.on_block_place(&alex, here(), &JukeboxItem::get_item());
        assert_eq!(outcome, EventOutcome::Continue);
        assert!(plugin.registry().contains(&here()));
        assert_eq!(host.messages_to(alex.uuid), vec!["&aPlaced a jukebox item!"]);
    }

    #[tokio::test]
    async fn placing_without_permission_is_cancelled() {
        let Fixture {
            dir: _dir, plugin, ..
        } = fixture();
        let guest = Actor::new(Uuid::new_v4(), "Guest", "world");
        let outcome = plugin.on_block_place(&guest, here(), &JukeboxItem::get_item());
        assert!(outcome.is_cancelled());
        assert!(plugin.registry().is_empty());
    }

    #[tokio::test]
    async fn interacting_opens_the_menu() {
        let Fixture {
            dir: _dir,
            host,
            plugin,
        } = fixture();
        plugin.registry().create(here()).unwrap();
        let alex = player("Alex");
        let guest = Actor::new(Uuid::new_v4(), "Guest", "world");

        assert!(plugin.on_interact(&alex, &here()).is_cancelled());
        assert!(plugin.on_interact(&guest, &here()).is_cancelled());
        assert_eq!(
            plugin.on_interact(&alex, &Location::new("world", 0, 0, 0)),
            EventOutcome::Continue
        );
        assert_eq!(host.shown_to(alex.uuid).len(), 1);
        assert!(host.shown_to(guest.uuid).is_empty());
    }

    #[tokio::test]
    async fn breaking_removes_the_jukebox() {
        let Fixture {
            dir: _dir,
            host,
            plugin,
        } = fixture();
        plugin.registry().create(here()).unwrap();
        let alex = player("Alex");
        let guest = Actor::new(Uuid::new_v4(), "Guest", "world");

        assert_eq!(plugin.on_block_break(&alex, &here(), true), EventOutcome::Continue);
        assert!(plugin.registry().contains(&here()));
        assert!(plugin.on_block_break(&guest, &here(), false).is_cancelled());
        assert!(plugin.registry().contains(&here()));

        assert_eq!(plugin.on_block_break(&alex, &here(), false), EventOutcome::Continue);
        assert!(!plugin.registry().contains(&here()));
        assert_eq!(host.messages_to(alex.uuid), vec!["&cRemoved a jukebox item"]);
    }

    #[tokio::test]
    async fn dropped_jukebox_is_tagged_again() {
        let Fixture {
            dir: _dir, plugin, ..
        } = fixture();
        plugin.registry().create(here()).unwrap();
        let mut drops = vec![
            ItemStack::new(JUKEBOX_MATERIAL),
            ItemStack::new("minecraft:music_disc_cat"),
        ];

        plugin.on_block_drop_items(&player("Alex"), &here(), &mut drops);

        assert!(JukeboxItem::is_item(&drops[0]));
        assert!(!JukeboxItem::is_item(&drops[1]));
        assert!(!plugin.registry().contains(&here()));
    }

    #[tokio::test(start_paused = true)]
    async fn clicking_a_track_plays_it() {
        let Fixture {
            dir: _dir,
            host,
            plugin,
        } = fixture();
        let jukebox = plugin.registry().create(here()).unwrap();
        let alex = player("Alex");
        plugin.on_interact(&alex, &here());

        let cat = TrackId::disc("cat");
        plugin.on_menu_click(&alex, slot_of(&plugin, &alex, &cat));

        assert_eq!(jukebox.current_track(), Some(cat));
        assert_eq!(jukebox.last_selected_by().as_deref(), Some("Alex"));
        assert!(plugin.menus().viewers().current(alex.uuid).is_none());
        assert!(host.take().contains(&HostEvent::Close(alex.uuid)));
    }

    #[tokio::test(start_paused = true)]
    async fn clicks_are_rate_limited() {
        let Fixture {
            dir: _dir,
            host,
            plugin,
        } = fixture();
        let jukebox = plugin.registry().create(here()).unwrap();
        let alex = player("Alex");
        plugin.on_interact(&alex, &here());
        plugin.on_menu_click(&alex, slot_of(&plugin, &alex, &TrackId::disc("cat")));

        plugin.on_interact(&alex, &here());
        plugin.on_menu_click(&alex, 49);
        assert!(jukebox.is_playing());
        assert_eq!(
            host.messages_to(alex.uuid),
            vec![brand("<error>Please wait before doing that again.")]
        );

        tokio::time::advance(Duration::from_secs(30)).await;
        plugin.on_menu_click(&alex, 49);
        assert!(!jukebox.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_menu_click_does_not_cut_off_a_song() {
        let Fixture {
            dir: _dir,
            host,
            plugin,
        } = fixture();
        let jukebox = plugin.registry().create(here()).unwrap();
        let (alex, steve) = (player("Alex"), player("Steve"));
        plugin.on_interact(&alex, &here());
        plugin.on_interact(&steve, &here());
        let far = slot_of(&plugin, &steve, &TrackId::disc("far"));
        let idle = plugin.menus().viewers().current(steve.uuid).unwrap().menu;

        plugin.on_menu_click(&alex, slot_of(&plugin, &alex, &TrackId::disc("cat")));
        // steve clicks before the refreshed menu arrives
        plugin.menus().viewers().open(steve.clone(), idle);

        plugin.on_menu_click(&steve, far);
        assert_eq!(jukebox.current_track(), Some(TrackId::disc("cat")));
        assert_eq!(
            host.messages_to(steve.uuid),
            vec![brand("<error>Something is already playing.")]
        );
    }

    #[tokio::test]
    async fn close_button_closes() {
        let Fixture {
            dir: _dir, plugin, ..
        } = fixture();
        plugin.registry().create(here()).unwrap();
        let alex = player("Alex");
        plugin.on_interact(&alex, &here());
        plugin.on_menu_click(&alex, 53);
        assert!(plugin.menus().viewers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn viewer_without_permission_cannot_play() {
        let Fixture {
            dir: _dir, plugin, ..
        } = fixture();
        let jukebox = plugin.registry().create(here()).unwrap();
        let dj = player("Dj");
        let listener = Actor::new(Uuid::new_v4(), "Listener", "world")
            .with_permissions(PermissionSet::none().with(Permission::OpenGui));
        plugin.on_interact(&dj, &here());
        let slot = slot_of(&plugin, &dj, &TrackId::disc("cat"));

        plugin.on_interact(&listener, &here());
        plugin.on_menu_click(&listener, slot);
        assert!(!jukebox.is_playing());
    }
}
