use std::fmt;

use serde::{Deserialize, Serialize};

use super::vector3::Vector3;

/// A block inside a named world.
///
/// This is the identity of a jukebox: it is hashed into the registry, written
/// to the saved location list and used to derive the menu identifier, so it
/// only ever holds integer block coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    #[serde(flatten)]
    pub position: Vector3<i32>,
}

impl Location {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            position: Vector3::new(x, y, z),
        }
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.position.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.position.y
    }

    #[must_use]
    pub const fn z(&self) -> i32 {
        self.position.z
    }

    /// Where note particles are spawned: one block above the block center.
    #[must_use]
    pub fn particle_origin(&self) -> Vector3<f64> {
        self.position.to_centered_f64(1.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.world, self.position)
    }
}
