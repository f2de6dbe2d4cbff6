use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Couldn't access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Couldn't parse {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Couldn't serialize settings: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("Couldn't parse {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Couldn't serialize location list: {0}")]
    JsonWrite(#[from] serde_json::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}
