use jukebox_config::ConfigError;
use jukebox_inventory::MenuError;
use log::log;
use std::fmt::Display;

use crate::{command::CommandError, jukebox::RegistryError, timer::TimerError};

pub trait JukeboxError: Send + std::error::Error + Display {
    fn log(&self) {
        log!(self.severity(), "{}", self.to_string());
    }

    fn severity(&self) -> log::Level;
}

impl<ErrorType: JukeboxError + 'static> From<ErrorType> for Box<dyn JukeboxError> {
    fn from(error: ErrorType) -> Self {
        Box::new(error)
    }
}

impl JukeboxError for MenuError {
    fn severity(&self) -> log::Level {
        match self {
            MenuError::ViewerOffline(_) => log::Level::Debug,
        }
    }
}

impl JukeboxError for ConfigError {
    fn severity(&self) -> log::Level {
        match self {
            ConfigError::Invalid(_) => log::Level::Warn,
            _ => log::Level::Error,
        }
    }
}

impl JukeboxError for TimerError {
    fn severity(&self) -> log::Level {
        log::Level::Error
    }
}

impl JukeboxError for RegistryError {
    fn severity(&self) -> log::Level {
        log::Level::Warn
    }
}

impl JukeboxError for CommandError {
    fn severity(&self) -> log::Level {
        match self {
            CommandError::PermissionDenied | CommandError::PlayerOnly => log::Level::Debug,
            CommandError::UnknownCommand(_) => log::Level::Info,
        }
    }
}
