use std::fs;
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    NoteOn { pitch: u8, velocity: u8 },
    NoteOff { pitch: u8 },
    ProgramChange { program: u8 },
    /// Microseconds per quarter note.
    SetTempo { tempo: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMessage {
    /// Ticks since the previous message of the same track.
    pub delta: u32,
    pub message: Message,
}

impl TimedMessage {
    pub fn new(delta: u32, message: Message) -> Self {
        Self { delta, message }
    }
}

pub type Track = Vec<TimedMessage>;

#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub name: String,
    pub ticks_per_beat: u16,
    pub tracks: Vec<Track>,
}

impl Song {
    pub fn new(name: impl Into<String>, ticks_per_beat: u16, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            ticks_per_beat,
            tracks,
        }
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let data = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let song = Self::parse(&name, &data)?;
        tracing::info!(
            "Loaded {} ({} tracks, {} ticks per beat)",
            song.name,
            song.tracks.len(),
            song.ticks_per_beat
        );
        Ok(song)
    }

    pub fn parse(name: &str, data: &[u8]) -> Result<Self, LoadError> {
        let smf = Smf::parse(data).map_err(|e| LoadError::Corrupt(e.to_string()))?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int(),
            Timing::Timecode(..) => {
                return Err(LoadError::Unsupported("SMPTE timecode timing".into()));
            }
        };
        if ticks_per_beat == 0 {
            return Err(LoadError::Unsupported("zero ticks per beat".into()));
        }

        let tracks = smf
            .tracks
            .iter()
            .map(|events| {
                // Events we don't model still take up time, so their deltas are
                // folded into whatever comes next.
                let mut pending: u32 = 0;
                let mut track = Vec::with_capacity(events.len());
                for event in events {
                    pending = pending.saturating_add(event.delta.as_int());
                    let message = match event.kind {
                        TrackEventKind::Midi { message, .. } => match message {
                            MidiMessage::NoteOn { key, vel } => Some(Message::NoteOn {
                                pitch: key.as_int(),
                                velocity: vel.as_int(),
                            }),
                            MidiMessage::NoteOff { key, .. } => Some(Message::NoteOff {
                                pitch: key.as_int(),
                            }),
                            MidiMessage::ProgramChange { program } => {
                                Some(Message::ProgramChange {
                                    program: program.as_int(),
                                })
                            }
                            _ => None,
                        },
                        TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                            Some(Message::SetTempo {
                                tempo: tempo.as_int(),
                            })
                        }
                        _ => None,
                    };
                    if let Some(message) = message {
                        track.push(TimedMessage::new(pending, message));
                        pending = 0;
                    }
                }
                track
            })
            .collect();

        Ok(Self::new(name, ticks_per_beat, tracks))
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.tracks.iter().flatten().map(|m| &m.message)
    }

    /// Pitches of every sounding note-on (velocity > 0), in file order.
    pub fn onset_pitches(&self) -> impl Iterator<Item = u8> + '_ {
        self.messages().filter_map(|m| match *m {
            Message::NoteOn { pitch, velocity } if velocity > 0 => Some(pitch),
            _ => None,
        })
    }

    pub fn pitch_range(&self) -> Option<(u8, u8)> {
        self.onset_pitches().fold(None, |range, pitch| match range {
            None => Some((pitch, pitch)),
            Some((lo, hi)) => Some((lo.min(pitch), hi.max(pitch))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Format 0, one track, 480 ticks per beat.
    fn smf_bytes(track_body: &[u8]) -> Vec<u8> {
        let mut bytes = vec![
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0, b'M', b'T', b'r', b'k',
        ];
        let len = track_body.len() as u32;
        bytes.extend_from_slice(&len.to_be_bytes());
        bytes.extend_from_slice(track_body);
        bytes
    }

    #[test]
    fn test_parse_basic_track() {
        let body = [
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // tempo 500000
            0x00, 0xC0, 0x05, // program change
            0x00, 0x90, 60, 100, // note on
            0x81, 0x70, 0x80, 60, 0, // note off after 240 ticks
            0x00, 0xFF, 0x2F, 0x00, // end of track
        ];
        let song = Song::parse("test.mid", &smf_bytes(&body)).unwrap();

        assert_eq!(song.ticks_per_beat, 480);
        assert_eq!(
            song.tracks[0],
            vec![
                TimedMessage::new(0, Message::SetTempo { tempo: 500_000 }),
                TimedMessage::new(0, Message::ProgramChange { program: 5 }),
                TimedMessage::new(0, Message::NoteOn { pitch: 60, velocity: 100 }),
                TimedMessage::new(240, Message::NoteOff { pitch: 60 }),
            ]
        );
    }

    #[test]
    fn test_unmodeled_events_keep_their_time() {
        let body = [
            0x00, 0x90, 60, 100, // note on
            0x60, 0xB0, 0x07, 0x64, // controller after 96 ticks
            0x60, 0x90, 60, 0, // note on vel 0 after another 96
            0x00, 0xFF, 0x2F, 0x00,
        ];
        let song = Song::parse("test.mid", &smf_bytes(&body)).unwrap();

        assert_eq!(song.tracks[0].len(), 2);
        assert_eq!(song.tracks[0][1].delta, 192);
        assert_eq!(
            song.tracks[0][1].message,
            Message::NoteOn { pitch: 60, velocity: 0 }
        );
    }

    #[test]
    fn test_garbage_is_corrupt() {
        assert!(matches!(
            Song::parse("x.mid", b"not a midi file"),
            Err(LoadError::Corrupt(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            Song::load(Path::new("/no/such/file.mid")),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn test_pitch_range_ignores_silent_note_ons() {
        let song = Song::new(
            "range",
            480,
            vec![vec![
                TimedMessage::new(0, Message::NoteOn { pitch: 30, velocity: 0 }),
                TimedMessage::new(0, Message::NoteOn { pitch: 64, velocity: 90 }),
                TimedMessage::new(0, Message::NoteOn { pitch: 52, velocity: 90 }),
            ]],
        );
        assert_eq!(song.pitch_range(), Some((52, 64)));
        assert_eq!(Song::new("empty", 480, vec![]).pitch_range(), None);
    }
}
