use std::collections::BTreeSet;

use jukebox_core::text::brand;

pub const JUKEBOX_MATERIAL: &str = "minecraft:jukebox";

/// An item as the plugin needs to see it: material, display name and the
/// boolean data tags stored on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    pub item: String,
    pub custom_name: Option<String>,
    pub tags: BTreeSet<String>,
}

impl ItemStack {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            custom_name: None,
            tags: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains(key)
    }
}

/// The placeable jukebox that turns into a song picker.
pub struct JukeboxItem;

impl JukeboxItem {
    pub const KEY: &'static str = "jukeboxgui:jukebox_item";

    #[must_use]
    pub fn get_item() -> ItemStack {
        let mut item = ItemStack::new(JUKEBOX_MATERIAL);
        Self::tag_and_name_item(&mut item);
        item
    }

    pub fn tag_item(item: &mut ItemStack) {
        item.tags.insert(Self::KEY.to_string());
    }

    pub fn tag_and_name_item(item: &mut ItemStack) {
        Self::tag_item(item);
        item.custom_name = Some(brand("&dJukebox Item"));
    }

    #[must_use]
    pub fn is_item(item: &ItemStack) -> bool {
        item.item == JUKEBOX_MATERIAL && item.has_tag(Self::KEY)
    }
}
