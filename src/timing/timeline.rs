use super::tempo::{TempoMap, TempoMode, ticks_to_seconds};
use crate::events::{NoteKind, TimelineEvent};
use crate::song::{Message, Song};

/// Every note transition of a song, time-ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn build(song: &Song, mode: TempoMode, default_tempo: u32) -> Self {
        let mut events = match mode {
            TempoMode::PerTrack => collect_per_track(song, default_tempo),
            TempoMode::Strict => collect_strict(song, default_tempo),
        };
        // Stable, so equal times keep track order then in-track order.
        events.sort_by(|a, b| a.time.total_cmp(&b.time));

        tracing::debug!("Built timeline with {} events", events.len());
        Self { events }
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Time of the last event, in seconds.
    pub fn duration(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.time)
    }
}

fn note_event(message: Message, time: f64, track: usize) -> Option<TimelineEvent> {
    let (kind, pitch, velocity) = match message {
        Message::NoteOn { pitch, velocity } if velocity > 0 => (NoteKind::On, pitch, velocity),
        Message::NoteOn { pitch, .. } | Message::NoteOff { pitch } => (NoteKind::Off, pitch, 0),
        _ => return None,
    };
    Some(TimelineEvent {
        time,
        kind,
        pitch,
        velocity,
        track,
    })
}

fn collect_per_track(song: &Song, default_tempo: u32) -> Vec<TimelineEvent> {
    let mut events = Vec::new();
    let mut tempo = default_tempo;
    for (track_idx, track) in song.tracks.iter().enumerate() {
        let mut time = 0.0;
        for msg in track {
            if let Message::SetTempo { tempo: t } = msg.message {
                tempo = t;
            }
            time += ticks_to_seconds(msg.delta as u64, tempo, song.ticks_per_beat);
            events.extend(note_event(msg.message, time, track_idx));
        }
    }
    events
}

fn collect_strict(song: &Song, default_tempo: u32) -> Vec<TimelineEvent> {
    let map = TempoMap::from_song(song, default_tempo);
    let mut events = Vec::new();
    for (track_idx, track) in song.tracks.iter().enumerate() {
        let mut tick: u64 = 0;
        for msg in track {
            tick += msg.delta as u64;
            events.extend(note_event(msg.message, map.seconds_at(tick), track_idx));
        }
    }
    events
}
