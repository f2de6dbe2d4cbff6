use async_trait::async_trait;
use jukebox_core::Permission;
use jukebox_inventory::JukeboxItem;

use crate::command::{Command, CommandError, CommandExecutor, CommandSender};
use crate::plugin::JukeboxPlugin;

const NAMES: [&str; 1] = ["get-jukebox"];

const DESCRIPTION: &str = "Give yourself a jukebox item.";

struct GetJukeboxExecutor;

#[async_trait]
impl CommandExecutor for GetJukeboxExecutor {
    async fn execute(
        &self,
        sender: &CommandSender,
        plugin: &JukeboxPlugin,
        _args: &[&str],
    ) -> Result<(), CommandError> {
        let Some(player) = sender.as_player() else {
            return Err(CommandError::PlayerOnly);
        };

        plugin.players().give_item(player.uuid, JukeboxItem::get_item());
        sender.send_message(plugin.players(), "&aGiven you a jukebox item");
        Ok(())
    }
}

pub fn command() -> Command {
    Command {
        names: &NAMES,
        description: DESCRIPTION,
        permission: Permission::Get,
        executor: &GetJukeboxExecutor,
    }
}
