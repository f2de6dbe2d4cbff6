use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vector3<T> {
    pub const fn new(x: T, y: T, z: T) -> Self {
        Vector3 { x, y, z }
    }
}

impl Vector3<i32> {
    /// Center of the block this vector points at, lifted by `lift` blocks.
    #[must_use]
    pub fn to_centered_f64(self, lift: f64) -> Vector3<f64> {
        Vector3 {
            x: f64::from(self.x) + 0.5,
            y: f64::from(self.y) + 0.5 + lift,
            z: f64::from(self.z) + 0.5,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Vector3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}
