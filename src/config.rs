use std::fs;
use std::path::Path;
use std::time::Duration;

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::timing::TempoMode;

pub const CONFIG_ENV: &str = "KEYFALL_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "keyfall.ron";
/// Largest grid the terminal screen can address.
pub const MAX_ROWS: usize = 1000;

/// Track palette entry. Kept separate from crossterm's `Color` so config files
/// only name the colors a terminal palette reliably has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Grey,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    White,
}

impl From<PaletteColor> for Color {
    fn from(color: PaletteColor) -> Self {
        match color {
            PaletteColor::Red => Color::DarkRed,
            PaletteColor::Green => Color::DarkGreen,
            PaletteColor::Yellow => Color::DarkYellow,
            PaletteColor::Blue => Color::DarkBlue,
            PaletteColor::Magenta => Color::DarkMagenta,
            PaletteColor::Cyan => Color::DarkCyan,
            PaletteColor::Grey => Color::DarkGrey,
            PaletteColor::BrightRed => Color::Red,
            PaletteColor::BrightGreen => Color::Green,
            PaletteColor::BrightYellow => Color::Yellow,
            PaletteColor::BrightBlue => Color::Blue,
            PaletteColor::BrightMagenta => Color::Magenta,
            PaletteColor::BrightCyan => Color::Cyan,
            PaletteColor::White => Color::White,
        }
    }
}

/// User-facing strings, so the header and prompts can be localized from the
/// config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub file: String,
    pub tracks: String,
    pub instruments: String,
    pub tempo: String,
    pub key: String,
    pub major: String,
    pub minor: String,
    pub matched: String,
    pub notes: String,
    pub chords: String,
    pub chord: String,
    pub hold: String,
    pub seconds: String,
    pub components: String,
    pub no_chord: String,
    pub enter_path: String,
    pub available_ports: String,
    pub select_port: String,
    pub invalid_choice: String,
    pub no_output: String,
    pub load_failed: String,
    pub playback_stopped: String,
    /// Instrument names by program number. Missing entries use the General
    /// MIDI names.
    pub instrument_names: Vec<String>,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            file: "File: ".into(),
            tracks: "Tracks: ".into(),
            instruments: "Instruments: ".into(),
            tempo: "Tempo: ".into(),
            key: "Key: ".into(),
            major: " major".into(),
            minor: " minor".into(),
            matched: "match: ".into(),
            notes: "Notes: ".into(),
            chords: "Chords: ".into(),
            chord: "Chord:".into(),
            hold: "Hold:".into(),
            seconds: "s".into(),
            components: "Notes:".into(),
            no_chord: "none".into(),
            enter_path: "MIDI file path: ".into(),
            available_ports: "Available MIDI outputs:".into(),
            select_port: "Select device (default 0): ".into(),
            invalid_choice: "Invalid choice, try again".into(),
            no_output: "No MIDI output device found".into(),
            load_failed: "Failed to load MIDI file:".into(),
            playback_stopped: "Playback stopped".into(),
            instrument_names: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub track_colors: Vec<PaletteColor>,
    pub note_names: Vec<String>,
    /// Microseconds per quarter note until the file says otherwise.
    pub default_tempo: u32,
    /// Keyboard window used when the file has no notes.
    pub min_note: u8,
    pub max_note: u8,
    /// Fewest keys a computed layout shows.
    pub min_span: u8,
    pub rows: usize,
    pub whole_step: usize,
    pub half_step: usize,
    /// Seconds a block takes to fall to the play line.
    pub drop_duration: f64,
    /// Seconds a note stays in the sounding set unless released earlier.
    pub note_duration: f64,
    pub tick_interval_ms: u64,
    pub tempo_mode: TempoMode,
    pub labels: Labels,
}

impl Default for Config {
    fn default() -> Self {
        use PaletteColor::*;
        Self {
            track_colors: vec![
                Red,
                Green,
                Yellow,
                Blue,
                Magenta,
                Cyan,
                Grey,
                BrightRed,
                BrightGreen,
                BrightYellow,
                BrightBlue,
                BrightMagenta,
                BrightCyan,
            ],
            note_names: [
                "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            default_tempo: 500_000,
            min_note: 48,
            max_note: 84,
            min_span: 72,
            rows: 40,
            whole_step: 1,
            half_step: 1,
            drop_duration: 0.5,
            note_duration: 0.5,
            tick_interval_ms: 10,
            tempo_mode: TempoMode::PerTrack,
            labels: Labels::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Config = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// `$KEYFALL_CONFIG`, else `keyfall.ron` in the working directory, else
    /// built-in defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            tracing::info!("Loading config from {}", path);
            return Self::load(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            tracing::info!("Loading config from {}", local.display());
            return Self::load(local);
        }
        tracing::debug!("No config file, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.note_names.len() != 12 {
            return Err(ConfigError::Invalid(format!(
                "note_names needs 12 entries, got {}",
                self.note_names.len()
            )));
        }
        if self.track_colors.is_empty() {
            return Err(ConfigError::Invalid("track_colors is empty".into()));
        }
        if !(2..=MAX_ROWS).contains(&self.rows) {
            return Err(ConfigError::Invalid(format!(
                "rows must be between 2 and {MAX_ROWS}, got {}",
                self.rows
            )));
        }
        if self.min_span == 0 || self.min_span > 128 {
            return Err(ConfigError::Invalid(format!(
                "min_span must be between 1 and 128, got {}",
                self.min_span
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be non-zero".into()));
        }
        if self.min_note > self.max_note || self.max_note > 127 {
            return Err(ConfigError::Invalid(format!(
                "bad default window {}..={}",
                self.min_note, self.max_note
            )));
        }
        if !(self.drop_duration > 0.0) || !(self.note_duration > 0.0) {
            return Err(ConfigError::Invalid(
                "drop_duration and note_duration must be positive".into(),
            ));
        }
        if self.default_tempo == 0 {
            return Err(ConfigError::Invalid("default_tempo must be non-zero".into()));
        }
        Ok(())
    }

    pub fn note_name(&self, pitch: u8) -> &str {
        &self.note_names[pitch as usize % 12]
    }

    pub fn track_color(&self, track: usize) -> Color {
        self.track_colors[track % self.track_colors.len()].into()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
