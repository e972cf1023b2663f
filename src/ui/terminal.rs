use std::io::{self, Write};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender, TryRecvError};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Print, ResetColor, SetBackgroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::{Cell, Frame, Screen};
use crate::engine::EngineCommand;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// The real terminal. Raw mode, alternate screen and hidden cursor last as
/// long as this value does.
pub struct TerminalScreen<W: Write> {
    out: W,
}

impl<W: Write> TerminalScreen<W> {
    pub fn enter(mut out: W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self { out })
    }

    fn print_line(&mut self, row: u16, text: &str) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(0, row),
            Print(text),
            Clear(ClearType::UntilNewLine)
        )
    }

    fn print_cells(&mut self, row: u16, cells: &[Cell]) -> io::Result<()> {
        queue!(self.out, MoveTo(0, row))?;
        for cell in cells {
            match cell.background {
                Some(color) => queue!(
                    self.out,
                    SetBackgroundColor(color),
                    Print(cell.glyph),
                    ResetColor
                )?,
                None => queue!(self.out, Print(cell.glyph))?,
            }
        }
        queue!(self.out, Clear(ClearType::UntilNewLine))
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn present(&mut self, frame: &Frame) -> io::Result<()> {
        let mut row: u16 = 0;
        self.print_line(row, &frame.header)?;
        for cells in &frame.grid {
            row += 1;
            self.print_cells(row, cells)?;
        }
        row += 1;
        self.print_cells(row, &frame.legend)?;
        row += 1;
        self.print_line(row, &frame.chord_line)?;
        self.out.flush()
    }
}

impl<W: Write> Drop for TerminalScreen<W> {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.out, ResetColor, Show, LeaveAlternateScreen) {
            tracing::warn!("Failed to restore terminal: {}", e);
        }
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!("Failed to leave raw mode: {}", e);
        }
    }
}

/// Background thread turning key presses into engine commands. Stops when
/// dropped.
pub struct InputListener {
    done: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl InputListener {
    pub fn spawn(commands: Sender<EngineCommand>) -> Self {
        let (done_tx, done_rx) = crossbeam::channel::bounded(0);
        let handle = std::thread::spawn(move || listen(commands, done_rx));
        Self {
            done: Some(done_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        self.done.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Turns SIGINT, SIGTERM and SIGHUP into a stop command, so the engine
/// silences the device and the terminal is restored before the process exits.
pub fn forward_signals(commands: Sender<EngineCommand>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        let _ = commands.send(EngineCommand::Stop);
    })
}

fn listen(commands: Sender<EngineCommand>, done: Receiver<()>) {
    while matches!(done.try_recv(), Err(TryRecvError::Empty)) {
        match event::poll(INPUT_POLL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                tracing::warn!("Input polling failed: {}", e);
                return;
            }
        }
        let command = match event::read() {
            Ok(Event::Key(key)) if is_stop_key(&key) => EngineCommand::Stop,
            Ok(Event::Resize(..)) => EngineCommand::Redraw,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("Failed to read input: {}", e);
                return;
            }
        };
        if commands.send(command).is_err() {
            return;
        }
    }
}

fn is_stop_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_keys() {
        let press = |code, modifiers| KeyEvent::new(code, modifiers);
        assert!(is_stop_key(&press(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_stop_key(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_stop_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_stop_key(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_stop_key(&press(KeyCode::Enter, KeyModifiers::NONE)));
    }
}
