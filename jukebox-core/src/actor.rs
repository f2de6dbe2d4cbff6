use uuid::Uuid;

use crate::permission::{Permission, PermissionSet};

/// First protocol version that ships jukebox song registry entries (1.21).
pub const JUKEBOX_SONG_PROTOCOL: i32 = 767;

/// A player as seen by the jukebox plugin at the moment of an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub uuid: Uuid,
    pub name: String,
    /// The world the player currently stands in.
    pub world: String,
    pub permissions: PermissionSet,
    /// The client's protocol version.
    pub protocol: i32,
}

impl Actor {
    pub fn new(uuid: Uuid, name: impl Into<String>, world: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            world: world.into(),
            permissions: PermissionSet::none(),
            protocol: JUKEBOX_SONG_PROTOCOL,
        }
    }

    #[must_use]
    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    #[must_use]
    pub const fn with_protocol(mut self, protocol: i32) -> Self {
        self.protocol = protocol;
        self
    }

    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.has(permission)
    }

    /// Clients before 1.21 have no `jukebox_song` translations.
    #[must_use]
    pub const fn is_legacy_client(&self) -> bool {
        self.protocol < JUKEBOX_SONG_PROTOCOL
    }
}
