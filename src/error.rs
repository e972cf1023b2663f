use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt MIDI file: {0}")]
    Corrupt(String),

    #[error("Unsupported MIDI file: {0}")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum OpenError {
    #[error("Failed to initialize MIDI output: {0}")]
    Init(String),

    #[error("Output port {index} does not exist")]
    NoSuchPort { index: usize },

    #[error("Failed to connect to {name}: {message}")]
    Connect { name: String, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A device choice that could not be used. Recovered by asking again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSelection {
    #[error("not a number: {0:?}")]
    NotANumber(String),

    #[error("{choice} is out of range (0..{count})")]
    OutOfRange { choice: usize, count: usize },
}

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("No MIDI output device available")]
    NoOutputDevice,

    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}
