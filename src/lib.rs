pub mod analysis;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod prompt;
pub mod song;
pub mod timing;
pub mod ui;

pub use config::Config;
pub use device::{MidirBackend, NoteSink, OutputBackend, open_output};
pub use engine::{Engine, EngineCommand, PlaybackOutcome};
pub use error::{ConfigError, InvalidSelection, LoadError, OpenError, PlayerError};
pub use events::NoteCommand;
pub use song::Song;
