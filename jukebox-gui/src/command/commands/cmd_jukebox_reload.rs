use async_trait::async_trait;
use jukebox_core::Permission;

use crate::command::{Command, CommandError, CommandExecutor, CommandSender};
use crate::error::JukeboxError;
use crate::plugin::JukeboxPlugin;

const NAMES: [&str; 1] = ["jukebox-reload"];

const DESCRIPTION: &str = "Reload the jukebox settings.";

struct ReloadExecutor;

#[async_trait]
impl CommandExecutor for ReloadExecutor {
    async fn execute(
        &self,
        sender: &CommandSender,
        plugin: &JukeboxPlugin,
        _args: &[&str],
    ) -> Result<(), CommandError> {
        match plugin.reload() {
            Ok(()) => sender.send_message(plugin.players(), "&aReloaded!"),
            Err(err) => {
                err.log();
                sender.send_message(
                    plugin.players(),
                    "&cUnable to reload, please check console for errors!",
                );
            }
        }
        Ok(())
    }
}

pub fn command() -> Command {
    Command {
        names: &NAMES,
        description: DESCRIPTION,
        permission: Permission::Reload,
        executor: &ReloadExecutor,
    }
}
