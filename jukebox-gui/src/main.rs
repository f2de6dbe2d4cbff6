#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use jukebox_config::{logging::LoggingConfig, JukeboxConfig, LoadTomlConfiguration, SETTINGS_FILE};
use jukebox_gui::console::{Console, ConsoleHost};
use jukebox_gui::{JukeboxError, JukeboxPlugin, PlaybackTimer};
use log::LevelFilter;
use tokio::io::{AsyncBufReadExt, BufReader};

const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const GIT_VERSION: &str = env!("GIT_VERSION");

fn init_logger(config: &LoggingConfig) {
    if config.enabled {
        let mut logger = simple_logger::SimpleLogger::new();
        logger = logger.with_timestamp_format(time::macros::format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ));

        if !config.timestamp {
            logger = logger.without_timestamps();
        }

        if config.env {
            logger = logger.env();
        }

        logger = logger.with_level(convert_logger_filter(config.level));

        logger = logger.with_colors(config.color);
        logger = logger.with_threads(config.threads);
        if let Err(err) = logger.init() {
            eprintln!("Couldn't set up logging: {err}");
        }
    }
}

const fn convert_logger_filter(level: jukebox_config::logging::LevelFilter) -> LevelFilter {
    match level {
        jukebox_config::logging::LevelFilter::Off => LevelFilter::Off,
        jukebox_config::logging::LevelFilter::Error => LevelFilter::Error,
        jukebox_config::logging::LevelFilter::Warn => LevelFilter::Warn,
        jukebox_config::logging::LevelFilter::Info => LevelFilter::Info,
        jukebox_config::logging::LevelFilter::Debug => LevelFilter::Debug,
        jukebox_config::logging::LevelFilter::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() {
    let time = Instant::now();
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(SETTINGS_FILE), PathBuf::from);

    let loaded = JukeboxConfig::load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_logger(&config.logging);
    if let Err(err) = loaded {
        err.log();
        log::warn!("Falling back to the default settings");
    }

    log::info!("Starting jukebox {CARGO_PKG_VERSION} ({GIT_VERSION})");

    let host = Arc::new(ConsoleHost::default());
    let plugin = Arc::new(JukeboxPlugin::new(
        config_path,
        config,
        host.clone(),
        PlaybackTimer::current(),
    ));
    plugin.load_jukeboxes();

    log::info!("Started in {}ms, type help for commands", time.elapsed().as_millis());

    setup_console(Console::new(plugin.clone(), host));

    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Unable to listen for Ctrl-C: {err}");
    }
    log::warn!("Received interrupt signal; stopping...");
    if let Err(err) = plugin.shutdown().await {
        err.log();
    }
}

fn setup_console(console: Console) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(tokio::io::stdin());
        loop {
            let mut out = String::new();
            match reader.read_line(&mut out).await {
                Ok(0) => break,
                Ok(_) => console.handle_line(&out).await,
                Err(err) => {
                    log::error!("Failed to read console line: {err}");
                    break;
                }
            }
        }
    });
}
