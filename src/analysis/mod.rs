mod chord;
mod key;
mod programs;
mod summary;

pub use chord::{CHORD_TEMPLATES, Chord, ChordHold, ChordTemplate, detect_chord};
pub use key::{
    KeyEstimate, MAJOR_STEPS, MINOR_STEPS, Mode, ScaleTemplate, detect_key,
    pitch_class_histogram, scale_templates,
};
pub use programs::{GM_PROGRAMS, localized_program_name, program_name};
pub use summary::{CHORD_CLUSTER_WINDOW, SongSummary, count_onset_clusters};
