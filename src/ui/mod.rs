mod keyboard;
mod piano_roll;
mod terminal;

pub use keyboard::{KeyboardLayout, RANGE_MARGIN, is_black_key, keyboard_window};
pub use piano_roll::{PianoRoll, View, chord_line, header_line};
pub use terminal::{InputListener, TerminalScreen, forward_signals};

use std::io;

use crossterm::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub background: Option<Color>,
}

impl Cell {
    pub fn blank() -> Self {
        Self::plain(' ')
    }

    pub fn plain(glyph: char) -> Self {
        Self {
            glyph,
            background: None,
        }
    }

    pub fn filled(glyph: char, background: Color) -> Self {
        Self {
            glyph,
            background: Some(background),
        }
    }
}

/// One complete picture: header, falling-block grid, key legend, chord line.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub header: String,
    pub grid: Vec<Vec<Cell>>,
    pub legend: Vec<Cell>,
    pub chord_line: String,
}

/// Something that can show a frame.
pub trait Screen {
    fn present(&mut self, frame: &Frame) -> io::Result<()>;
}

impl<S: Screen + ?Sized> Screen for Box<S> {
    fn present(&mut self, frame: &Frame) -> io::Result<()> {
        (**self).present(frame)
    }
}

/// Forwards frames to a screen, skipping any frame identical to the last one
/// shown.
pub struct Renderer<S: Screen> {
    screen: S,
    last_frame: Option<Frame>,
}

impl<S: Screen> Renderer<S> {
    pub fn new(screen: S) -> Self {
        Self {
            screen,
            last_frame: None,
        }
    }

    /// Returns whether the screen was redrawn.
    pub fn render(&mut self, frame: Frame) -> io::Result<bool> {
        if self.last_frame.as_ref() == Some(&frame) {
            return Ok(false);
        }
        self.screen.present(&frame)?;
        self.last_frame = Some(frame);
        Ok(true)
    }

    /// Forces the next frame through, e.g. after the terminal was resized.
    pub fn invalidate(&mut self) {
        self.last_frame = None;
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }
}
