use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum PluginError {
    #[error("Failed to read configuration {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("No platform block for {0} in configuration")]
    PlatformNotFound(String),

    #[error("Platform block for {0} has no switches list")]
    MissingSwitchList(String),

    #[error("Accessory cache {0:?} could not be read; refusing to overwrite it")]
    CacheUnreadable(PathBuf),

    #[error("Unknown accessory: {0}")]
    UnknownAccessory(String),

    #[error("Accessory has no switch service: {0}")]
    MissingSwitchService(String),

    #[error("Prowl request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PluginError>;
