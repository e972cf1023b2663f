use super::key::{KeyEstimate, detect_key, pitch_class_histogram};
use super::programs::localized_program_name;
use crate::config::Config;
use crate::events::NoteKind;
use crate::song::{Message, Song};
use crate::timing::Timeline;

/// Onsets closer than this to the start of the current cluster belong to it.
pub const CHORD_CLUSTER_WINDOW: f64 = 0.5;

/// File-level facts shown in the header. Computed once at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct SongSummary {
    pub file_name: String,
    pub track_count: usize,
    /// Program name and how many tracks use it, in order of first use.
    pub instruments: Vec<(String, usize)>,
    /// From the last tempo change in file order.
    pub bpm: u32,
    pub key: KeyEstimate,
    pub note_count: usize,
    pub chord_count: usize,
}

impl SongSummary {
    pub fn analyze(song: &Song, timeline: &Timeline, config: &Config) -> Self {
        let mut instruments: Vec<(String, usize)> = Vec::new();
        for track in &song.tracks {
            let program = track
                .iter()
                .filter_map(|m| match m.message {
                    Message::ProgramChange { program } => Some(program),
                    _ => None,
                })
                .last()
                .unwrap_or(0);
            let name = localized_program_name(&config.labels.instrument_names, program);
            match instruments.iter_mut().find(|(n, _)| n.as_str() == name) {
                Some((_, count)) => *count += 1,
                None => instruments.push((name.to_owned(), 1)),
            }
        }

        let tempo = song
            .messages()
            .filter_map(|m| match *m {
                Message::SetTempo { tempo } => Some(tempo),
                _ => None,
            })
            .last()
            .unwrap_or(config.default_tempo)
            .max(1);

        Self {
            file_name: song.name.clone(),
            track_count: song.tracks.len(),
            instruments,
            bpm: 60_000_000 / tempo,
            key: detect_key(&pitch_class_histogram(song.onset_pitches())),
            note_count: song.onset_pitches().count(),
            chord_count: count_onset_clusters(timeline, CHORD_CLUSTER_WINDOW),
        }
    }
}

/// Groups onsets into clusters; a cluster ends once an onset comes more than
/// `window` seconds after the cluster's first onset.
pub fn count_onset_clusters(timeline: &Timeline, window: f64) -> usize {
    let mut clusters = 0;
    let mut cluster_start: Option<f64> = None;
    for event in timeline.events().iter().filter(|e| e.kind == NoteKind::On) {
        match cluster_start {
            Some(start) if event.time - start <= window => {}
            _ => {
                clusters += 1;
                cluster_start = Some(event.time);
            }
        }
    }
    clusters
}
