pub mod actor;
pub mod math;
pub mod permission;
pub mod text;
pub mod track;

pub use actor::Actor;
pub use math::position::Location;
pub use permission::{Permission, PermissionSet};
pub use track::{TrackCatalog, TrackId};
