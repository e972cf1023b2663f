use super::keyboard::{KeyboardLayout, is_black_key};
use super::{Cell, Frame};
use crate::analysis::{Chord, Mode, SongSummary};
use crate::config::{Config, Labels};
use crate::lifecycle::SoundingNotes;
use crate::timing::Block;

/// Everything that changes from one loop iteration to the next.
pub struct View<'a> {
    pub blocks: &'a [Block],
    pub sounding: &'a SoundingNotes,
    pub chord: Option<&'a Chord>,
    pub hold: f64,
}

/// Falling-block view over a keyboard: one column per key, play line at the
/// bottom, key legend below it.
pub struct PianoRoll<'a> {
    layout: &'a KeyboardLayout,
    config: &'a Config,
}

impl<'a> PianoRoll<'a> {
    pub fn new(layout: &'a KeyboardLayout, config: &'a Config) -> Self {
        Self { layout, config }
    }

    pub fn draw(&self, header: &str, view: &View) -> Frame {
        let mut grid = self.draw_columns();
        self.draw_blocks(&mut grid, view.blocks);
        Frame {
            header: header.to_owned(),
            grid,
            legend: self.draw_legend(view.sounding),
            chord_line: chord_line(view.chord, view.hold, &self.config.labels),
        }
    }

    fn draw_columns(&self) -> Vec<Vec<Cell>> {
        let mut row = vec![Cell::blank(); self.layout.width()];
        for (_, col) in self.layout.keys() {
            row[col] = Cell::plain('|');
        }
        vec![row; self.config.rows]
    }

    fn draw_blocks(&self, grid: &mut [Vec<Cell>], blocks: &[Block]) {
        let last_row = grid.len().saturating_sub(1);
        for block in blocks {
            let Some(col) = self.layout.column(block.pitch) else {
                continue;
            };
            let row = (block.steps.min(last_row as f64).max(0.0).round() as usize).min(last_row);
            grid[row][col] = Cell::filled(' ', self.config.track_color(block.track));
        }
    }

    fn draw_legend(&self, sounding: &SoundingNotes) -> Vec<Cell> {
        let mut legend = vec![Cell::blank(); self.layout.width()];
        for (pitch, col) in self.layout.keys() {
            let glyph = if is_black_key(pitch) {
                '#'
            } else {
                self.config.note_name(pitch).chars().next().unwrap_or('?')
            };
            legend[col] = match sounding.latest(pitch) {
                Some(note) => Cell::filled(glyph, self.config.track_color(note.track)),
                None => Cell::plain(glyph),
            };
        }
        legend
    }
}

pub fn header_line(summary: &SongSummary, config: &Config) -> String {
    let labels = &config.labels;
    let instruments = summary
        .instruments
        .iter()
        .map(|(name, count)| format!("{count} {name}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mode = match summary.key.mode {
        Mode::Major => &labels.major,
        Mode::Minor => &labels.minor,
    };
    format!(
        "{}{}  {}{}  {}{}  {}{}BPM  {}{}{} ({}{})  {}{}  {}{}",
        labels.file,
        summary.file_name,
        labels.tracks,
        summary.track_count,
        labels.instruments,
        instruments,
        labels.tempo,
        summary.bpm,
        labels.key,
        config.note_name(summary.key.tonic),
        mode,
        labels.matched,
        summary.key.score,
        labels.notes,
        summary.note_count,
        labels.chords,
        summary.chord_count,
    )
}

pub fn chord_line(chord: Option<&Chord>, hold: f64, labels: &Labels) -> String {
    match chord {
        Some(chord) => format!(
            "{} {}  {} {:.2}{}  {} {}",
            labels.chord,
            chord.label,
            labels.hold,
            hold,
            labels.seconds,
            labels.components,
            chord.notes.join(" ")
        ),
        None => format!("{} {}", labels.chord, labels.no_chord),
    }
}
