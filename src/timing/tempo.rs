use serde::{Deserialize, Serialize};

use crate::song::{Message, Song};

/// How tempo changes found in the file apply to the tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempoMode {
    /// Tracks are scanned in file order with one running tempo. A change
    /// affects the rest of the stream being scanned and carries into the
    /// next track's pass.
    #[default]
    PerTrack,
    /// Every tempo change of every track goes into one file-wide map keyed by
    /// absolute tick, and all tracks are timed against it.
    Strict,
}

/// Seconds covered by `ticks` at `tempo` microseconds per quarter note.
pub fn ticks_to_seconds(ticks: u64, tempo: u32, ticks_per_beat: u16) -> f64 {
    let tempo = tempo.max(1) as f64;
    let ticks_per_beat = ticks_per_beat.max(1) as f64;
    ticks as f64 * tempo / (ticks_per_beat * 1_000_000.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    tick: u64,
    seconds: f64,
    tempo: u32,
}

/// Piecewise-constant tempo over absolute ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    segments: Vec<Segment>,
    ticks_per_beat: u16,
}

impl TempoMap {
    pub fn constant(tempo: u32, ticks_per_beat: u16) -> Self {
        Self {
            segments: vec![Segment {
                tick: 0,
                seconds: 0.0,
                tempo,
            }],
            ticks_per_beat,
        }
    }

    /// Collects every `SetTempo` in the song. Changes at the same tick resolve
    /// to the one that comes last in file order.
    pub fn from_song(song: &Song, default_tempo: u32) -> Self {
        let mut changes: Vec<(u64, u32)> = Vec::new();
        for track in &song.tracks {
            let mut tick: u64 = 0;
            for msg in track {
                tick += msg.delta as u64;
                if let Message::SetTempo { tempo } = msg.message {
                    changes.push((tick, tempo));
                }
            }
        }
        changes.sort_by_key(|&(tick, _)| tick);

        let mut map = Self::constant(default_tempo, song.ticks_per_beat);
        for (tick, tempo) in changes {
            map.push_change(tick, tempo);
        }
        map
    }

    fn push_change(&mut self, tick: u64, tempo: u32) {
        let ticks_per_beat = self.ticks_per_beat;
        let next = match self.segments.last_mut() {
            Some(last) if last.tick == tick => {
                last.tempo = tempo;
                return;
            }
            Some(last) => Segment {
                tick,
                seconds: last.seconds
                    + ticks_to_seconds(tick - last.tick, last.tempo, ticks_per_beat),
                tempo,
            },
            None => Segment {
                tick,
                seconds: 0.0,
                tempo,
            },
        };
        self.segments.push(next);
    }

    pub fn seconds_at(&self, tick: u64) -> f64 {
        let idx = self.segments.partition_point(|s| s.tick <= tick);
        let segment = &self.segments[idx.saturating_sub(1)];
        segment.seconds + ticks_to_seconds(tick - segment.tick, segment.tempo, self.ticks_per_beat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::TimedMessage;

    #[test]
    fn test_quarter_note_at_120_bpm() {
        assert_eq!(ticks_to_seconds(480, 500_000, 480), 0.5);
        assert_eq!(ticks_to_seconds(240, 500_000, 480), 0.25);
        assert_eq!(ticks_to_seconds(0, 500_000, 480), 0.0);
    }

    #[test]
    fn test_output_is_non_negative_and_increasing() {
        for tempo in [0, 1, 250_000, 500_000, 1_000_000, 16_777_215] {
            for tpb in [1, 96, 480, 960] {
                let mut previous = ticks_to_seconds(0, tempo, tpb);
                assert!(previous >= 0.0);
                for ticks in 1..200 {
                    let seconds = ticks_to_seconds(ticks, tempo, tpb);
                    assert!(seconds > previous, "tempo {tempo} tpb {tpb} ticks {ticks}");
                    previous = seconds;
                }
            }
        }
    }

    #[test]
    fn test_tempo_map_integrates_segments() {
        let song = Song::new(
            "map",
            480,
            vec![
                vec![TimedMessage::new(0, Message::NoteOn { pitch: 60, velocity: 1 })],
                vec![
                    TimedMessage::new(480, Message::SetTempo { tempo: 1_000_000 }),
                    TimedMessage::new(480, Message::SetTempo { tempo: 250_000 }),
                ],
            ],
        );
        let map = TempoMap::from_song(&song, 500_000);

        assert_eq!(map.seconds_at(480), 0.5);
        assert_eq!(map.seconds_at(960), 1.5);
        assert_eq!(map.seconds_at(1440), 1.75);
    }

    #[test]
    fn test_tempo_change_at_zero_replaces_default() {
        let song = Song::new(
            "zero",
            96,
            vec![vec![TimedMessage::new(0, Message::SetTempo { tempo: 1_000_000 })]],
        );
        let map = TempoMap::from_song(&song, 500_000);
        assert_eq!(map.seconds_at(96), 1.0);
    }
}
