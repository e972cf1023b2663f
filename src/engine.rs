use std::io;
use std::time::Instant;

use crossbeam::channel::{Receiver, RecvTimeoutError};

use crate::analysis::{ChordHold, SongSummary, detect_chord};
use crate::config::Config;
use crate::device::NoteSink;
use crate::error::PlayerError;
use crate::events::NoteKind;
use crate::lifecycle::NoteLifecycle;
use crate::song::Song;
use crate::timing::{BlockScheduler, Timeline};
use crate::ui::{KeyboardLayout, PianoRoll, Renderer, Screen, View, header_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Stop,
    /// Repaint the whole frame, e.g. after a resize.
    Redraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Interrupted,
}

/// Plays one song: spawns falling blocks, sounds notes as blocks land and
/// redraws the screen, all from a single loop.
pub struct Engine<'a, S: NoteSink, D: Screen> {
    config: &'a Config,
    header: String,
    layout: KeyboardLayout,
    scheduler: BlockScheduler,
    notes: NoteLifecycle<S>,
    chord_hold: ChordHold,
    renderer: Renderer<D>,
    shut_down: bool,
}

impl<'a, S: NoteSink, D: Screen> Engine<'a, S, D> {
    pub fn new(song: &Song, config: &'a Config, sink: S, screen: D) -> Self {
        let timeline = Timeline::build(song, config.tempo_mode, config.default_tempo);
        let summary = SongSummary::analyze(song, &timeline, config);
        let layout = KeyboardLayout::for_song(song.pitch_range(), config);
        tracing::info!(
            "Playing {} ({} events, {:.2}s)",
            song.name,
            timeline.len(),
            timeline.duration()
        );

        Self {
            config,
            header: header_line(&summary, config),
            layout,
            scheduler: BlockScheduler::new(timeline, config.drop_duration, config.rows),
            notes: NoteLifecycle::new(sink),
            chord_hold: ChordHold::default(),
            renderer: Renderer::new(screen),
            shut_down: false,
        }
    }

    /// Runs until the song ends or a stop command arrives. Every device note
    /// is switched off and the sink closed before returning, on every path.
    pub fn run(&mut self, commands: &Receiver<EngineCommand>) -> Result<PlaybackOutcome, PlayerError> {
        let result = self.run_loop(commands);
        self.shutdown();
        result
    }

    fn run_loop(&mut self, commands: &Receiver<EngineCommand>) -> Result<PlaybackOutcome, PlayerError> {
        let start = Instant::now();
        let interval = self.config.tick_interval();
        loop {
            self.tick(start.elapsed().as_secs_f64())?;
            if self.scheduler.is_finished() {
                tracing::info!("Playback finished");
                return Ok(PlaybackOutcome::Completed);
            }

            match commands.recv_timeout(interval) {
                Ok(EngineCommand::Stop) => {
                    tracing::info!("Playback stopped");
                    return Ok(PlaybackOutcome::Interrupted);
                }
                Ok(EngineCommand::Redraw) => self.renderer.invalidate(),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => std::thread::sleep(interval),
            }
        }
    }

    /// One loop iteration at `now` seconds since playback start.
    pub fn tick(&mut self, now: f64) -> io::Result<()> {
        self.scheduler.admit(now);
        self.scheduler.advance(now);
        for block in self.scheduler.take_landed() {
            match block.kind {
                NoteKind::On => self.notes.onset(
                    block.pitch,
                    block.velocity,
                    block.track,
                    self.config.note_duration,
                    now,
                ),
                NoteKind::Off => {
                    self.notes.release(block.pitch);
                }
            }
        }
        self.notes.expire(now);

        let chord = detect_chord(self.notes.sounding().pitches(), &self.config.note_names);
        let hold = self.chord_hold.update(chord.as_ref(), now);
        let view = View {
            blocks: self.scheduler.blocks(),
            sounding: self.notes.sounding(),
            chord: chord.as_ref(),
            hold,
        };
        let frame = PianoRoll::new(&self.layout, self.config).draw(&self.header, &view);
        self.renderer.render(frame)?;
        Ok(())
    }

    /// Switches off every key of the layout and closes the sink. Only the
    /// first call has an effect; dropping the engine calls it too.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.notes.all_notes_off(self.layout.range());
        self.notes.close();
    }

    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished()
    }

    pub fn notes(&self) -> &NoteLifecycle<S> {
        &self.notes
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn screen(&self) -> &D {
        self.renderer.screen()
    }
}

impl<S: NoteSink, D: Screen> Drop for Engine<'_, S, D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
