pub mod error;
pub mod item;
pub mod menu;
pub mod render;
pub mod viewers;

pub use error::MenuError;
pub use item::{ItemStack, JukeboxItem};
pub use menu::{Cell, ClickAction, Menu, MenuId, MenuText};
pub use render::{render_menu, PlaybackSnapshot};
pub use viewers::{OpenMenu, ViewerRegistry};
