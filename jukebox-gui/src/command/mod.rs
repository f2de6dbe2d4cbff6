use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use jukebox_core::{Actor, Permission};

use crate::error::JukeboxError;
use crate::host::Players;
use crate::plugin::JukeboxPlugin;

mod commands;

pub use commands::{cmd_get_jukebox, cmd_jukebox_reload};

/// Whoever typed the command.
#[derive(Clone, Debug)]
pub enum CommandSender {
    Console,
    Player(Actor),
}

impl fmt::Display for CommandSender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CommandSender::Console => f.write_str("Console"),
            CommandSender::Player(actor) => f.write_str(&actor.name),
        }
    }
}

impl CommandSender {
    pub fn send_message(&self, players: &dyn Players, message: &str) {
        match self {
            CommandSender::Console => log::info!("{message}"),
            CommandSender::Player(actor) => players.send_message(actor.uuid, message),
        }
    }

    #[must_use]
    pub const fn as_player(&self) -> Option<&Actor> {
        match self {
            CommandSender::Player(actor) => Some(actor),
            CommandSender::Console => None,
        }
    }

    /// The console may do everything.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        match self {
            CommandSender::Console => true,
            CommandSender::Player(actor) => actor.has_permission(permission),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("You don't have permission to use this command.")]
    PermissionDenied,
    #[error("Only players can use this command.")]
    PlayerOnly,
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

#[async_trait]
pub trait CommandExecutor: Sync {
    async fn execute(
        &self,
        sender: &CommandSender,
        plugin: &JukeboxPlugin,
        args: &[&str],
    ) -> Result<(), CommandError>;
}

#[derive(Clone, Copy)]
pub struct Command {
    pub names: &'static [&'static str],
    pub description: &'static str,
    pub permission: Permission,
    pub executor: &'static dyn CommandExecutor,
}

#[derive(Default)]
pub struct CommandDispatcher {
    commands: HashMap<&'static str, Command>,
}

impl CommandDispatcher {
    pub fn register(&mut self, command: Command) {
        for name in command.names {
            self.commands.insert(*name, command);
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Every registered command once, ordered by its primary name.
    #[must_use]
    pub fn commands(&self) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self
            .commands
            .iter()
            .filter(|&(name, command)| command.names.first() == Some(name))
            .map(|(_, command)| command)
            .collect();
        commands.sort_by_key(|command| command.names[0]);
        commands
    }

    /// One `name - description` line per command the sender may run.
    #[must_use]
    pub fn help(&self, sender: &CommandSender) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter(|command| sender.has_permission(command.permission))
            .map(|command| format!("{} - {}", command.names.join(", "), command.description))
            .collect()
    }

    /// Runs `line` and reports any failure back to `sender`.
    pub async fn handle_command(
        &self,
        sender: &CommandSender,
        plugin: &JukeboxPlugin,
        line: &str,
    ) {
        if let Err(err) = self.dispatch(sender, plugin, line).await {
            err.log();
            sender.send_message(plugin.players(), &format!("&c{err}"));
        }
    }

    pub async fn dispatch(
        &self,
        sender: &CommandSender,
        plugin: &JukeboxPlugin,
        line: &str,
    ) -> Result<(), CommandError> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(CommandError::UnknownCommand(String::new()));
        };
        let name = name.strip_prefix('/').unwrap_or(name);
        let command = self
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        if !sender.has_permission(command.permission) {
            return Err(CommandError::PermissionDenied);
        }

        let args: Vec<&str> = parts.collect();
        log::debug!("{sender} ran {name}");
        command.executor.execute(sender, plugin, &args).await
    }
}

#[must_use]
pub fn default_dispatcher() -> CommandDispatcher {
    let mut dispatcher = CommandDispatcher::default();

    dispatcher.register(cmd_get_jukebox::command());
    dispatcher.register(cmd_jukebox_reload::command());

    dispatcher
}

#[cfg(test)]
mod tests {
    use std::fs;

    use jukebox_core::Actor;
    use uuid::Uuid;

    use super::*;
    use crate::host::testing::HostEvent;
    use crate::plugin::tests::{fixture, player, Fixture};

    #[test]
    fn help_lists_each_command_once() {
        let dispatcher = default_dispatcher();
        assert_eq!(
            dispatcher.help(&CommandSender::Console),
            vec![
                "get-jukebox - Give yourself a jukebox item.",
                "jukebox-reload - Reload the jukebox settings.",
            ]
        );

        let guest = Actor::new(Uuid::new_v4(), "Guest", "world");
        assert!(dispatcher.help(&CommandSender::Player(guest)).is_empty());
    }

    #[tokio::test]
    async fn get_jukebox_needs_a_player() {
        let Fixture {
            dir: _dir, plugin, ..
        } = fixture();
        let dispatcher = default_dispatcher();
        assert!(matches!(
            dispatcher
                .dispatch(&CommandSender::Console, &plugin, "get-jukebox")
                .await,
            Err(CommandError::PlayerOnly)
        ));
    }

    #[tokio::test]
    async fn get_jukebox_hands_out_the_item() {
        let Fixture {
            dir: _dir,
            host,
            plugin,
        } = fixture();
        let alex = player("Alex");

        plugin
            .handle_command(&CommandSender::Player(alex.clone()), "/get-jukebox")
            .await;

        assert_eq!(
            host.count(|e| matches!(e, HostEvent::Give(uuid, _) if *uuid == alex.uuid)),
            1
        );
        assert_eq!(host.messages_to(alex.uuid), vec!["&aGiven you a jukebox item"]);
    }

    #[tokio::test]
    async fn missing_permission_is_reported() {
        let Fixture {
            dir: _dir,
            host,
            plugin,
        } = fixture();
        let guest = Actor::new(Uuid::new_v4(), "Guest", "world");

        plugin
            .handle_command(&CommandSender::Player(guest.clone()), "jukebox-reload")
            .await;

        assert_eq!(
            host.messages_to(guest.uuid),
            vec!["&cYou don't have permission to use this command."]
        );
    }

    #[tokio::test]
    async fn reload_reports_its_outcome() {
        let Fixture {
            dir: _dir,
            host,
            plugin,
        } = fixture();
        let alex = CommandSender::Player(player("Alex"));
        let uuid = alex.as_player().unwrap().uuid;

        plugin.handle_command(&alex, "jukebox-reload").await;
        fs::write(plugin.settings_path(), "volume = 4.0\n").unwrap();
        plugin.handle_command(&alex, "jukebox-reload").await;

        assert_eq!(
            host.messages_to(uuid),
            vec![
                "&aReloaded!",
                "&cUnable to reload, please check console for errors!"
            ]
        );
    }

    #[tokio::test]
    async fn unknown_commands_are_rejected() {
        let Fixture {
            dir: _dir, plugin, ..
        } = fixture();
        assert!(matches!(
            default_dispatcher()
                .dispatch(&CommandSender::Console, &plugin, "dance")
                .await,
            Err(CommandError::UnknownCommand(name)) if name == "dance"
        ));
    }
}
