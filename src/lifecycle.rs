use std::collections::{BTreeMap, VecDeque};
use std::ops::RangeInclusive;

use crate::device::NoteSink;
use crate::events::NoteCommand;

/// One audible instance of a pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub velocity: u8,
    /// Seconds since playback start.
    pub start_time: f64,
    pub track: usize,
    pub duration: f64,
}

impl NoteEvent {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.start_time >= self.duration
    }
}

/// Sounding instances per pitch, oldest first. A pitch with no instances is
/// never kept around after `prune_empty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoundingNotes {
    queues: BTreeMap<u8, VecDeque<NoteEvent>>,
}

impl SoundingNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// The queue for `pitch`, created empty if missing.
    pub fn queue_for(&mut self, pitch: u8) -> &mut VecDeque<NoteEvent> {
        self.queues.entry(pitch).or_default()
    }

    pub fn queue(&self, pitch: u8) -> Option<&VecDeque<NoteEvent>> {
        self.queues.get(&pitch)
    }

    pub fn prune_empty(&mut self) {
        self.queues.retain(|_, queue| !queue.is_empty());
    }

    pub fn depth(&self, pitch: u8) -> usize {
        self.queues.get(&pitch).map_or(0, VecDeque::len)
    }

    /// Pitches with at least one instance, ascending.
    pub fn pitches(&self) -> impl Iterator<Item = u8> + '_ {
        self.queues
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|(&pitch, _)| pitch)
    }

    /// Most recent instance of `pitch`.
    pub fn latest(&self, pitch: u8) -> Option<&NoteEvent> {
        self.queues.get(&pitch).and_then(|queue| queue.back())
    }

    pub fn is_empty(&self) -> bool {
        self.pitches().next().is_none()
    }

    pub fn clear(&mut self) {
        self.queues.clear();
    }

    fn retain(&mut self, mut keep: impl FnMut(&NoteEvent) -> bool) {
        for queue in self.queues.values_mut() {
            queue.retain(|note| keep(note));
        }
        self.prune_empty();
    }
}

/// Owns the output sink and the sounding set, and keeps the two in step.
pub struct NoteLifecycle<S: NoteSink> {
    sink: S,
    sounding: SoundingNotes,
}

impl<S: NoteSink> NoteLifecycle<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            sounding: SoundingNotes::new(),
        }
    }

    pub fn onset(&mut self, pitch: u8, velocity: u8, track: usize, duration: f64, now: f64) {
        self.sink.send(NoteCommand::NoteOn { pitch, velocity });
        self.sounding.queue_for(pitch).push_back(NoteEvent {
            pitch,
            velocity,
            start_time: now,
            track,
            duration,
        });
    }

    /// Ends the oldest instance of `pitch`. The device always gets the
    /// note-off: an instance that already expired may still be ringing there.
    pub fn release(&mut self, pitch: u8) -> Option<NoteEvent> {
        self.sink.send(NoteCommand::NoteOff { pitch });
        let released = self.sounding.queue_for(pitch).pop_front();
        self.sounding.prune_empty();
        released
    }

    /// Drops instances whose lifetime is over. No device traffic.
    pub fn expire(&mut self, now: f64) {
        self.sounding.retain(|note| !note.is_expired(now));
    }

    pub fn all_notes_off(&mut self, pitches: RangeInclusive<u8>) {
        for pitch in pitches {
            self.sink.send(NoteCommand::NoteOff { pitch });
        }
        self.sounding.clear();
    }

    pub fn close(&mut self) {
        self.sink.close();
    }

    pub fn sounding(&self) -> &SoundingNotes {
        &self.sounding
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
