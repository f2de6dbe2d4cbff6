use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named capability checked before touching a jukebox.
///
/// The host owns the actual permission system; this crate only needs to know
/// which node guards which action:
/// - `OpenGui`: `jukebox.open-gui`: open the song picker by interacting with the block.
/// - `Play`: `jukebox.play`: start a song from the menu.
/// - `Stop`: `jukebox.stop`: stop the current song from the menu.
/// - `Create`: `jukebox.create`: place a tagged jukebox item.
/// - `Delete`: `jukebox.delete`: break a registered jukebox.
/// - `Get`: `jukebox.get`: receive the jukebox item via `/get-jukebox`.
/// - `Reload`: `jukebox.reload`: reload the settings file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Permission {
    OpenGui,
    Play,
    Stop,
    Create,
    Delete,
    Get,
    Reload,
}

impl Permission {
    pub const ALL: [Permission; 7] = [
        Permission::OpenGui,
        Permission::Play,
        Permission::Stop,
        Permission::Create,
        Permission::Delete,
        Permission::Get,
        Permission::Reload,
    ];

    #[must_use]
    pub const fn node(self) -> &'static str {
        match self {
            Permission::OpenGui => "jukebox.open-gui",
            Permission::Play => "jukebox.play",
            Permission::Stop => "jukebox.stop",
            Permission::Create => "jukebox.create",
            Permission::Delete => "jukebox.delete",
            Permission::Get => "jukebox.get",
            Permission::Reload => "jukebox.reload",
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|permission| permission.node() == s)
            .ok_or_else(|| format!("Unknown permission node: {s}"))
    }
}

impl Serialize for Permission {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.node())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let node = String::deserialize(deserializer)?;
        node.parse().map_err(serde::de::Error::custom)
    }
}

/// The capabilities an actor held when a check was made.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(HashSet<Permission>);

impl PermissionSet {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn all() -> Self {
        Self(Permission::ALL.into_iter().collect())
    }

    #[must_use]
    pub fn with(mut self, permission: Permission) -> Self {
        self.0.insert(permission);
        self
    }

    #[must_use]
    pub fn without(mut self, permission: Permission) -> Self {
        self.0.remove(&permission);
        self
    }

    #[must_use]
    pub fn has(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
