#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordTemplate {
    pub suffix: &'static str,
    /// Semitones above the root, reduced to one octave.
    pub intervals: &'static [u8],
}

impl ChordTemplate {
    const fn new(suffix: &'static str, intervals: &'static [u8]) -> Self {
        Self { suffix, intervals }
    }

    fn mask(&self) -> u16 {
        interval_mask(self.intervals.iter().copied())
    }
}

/// Scanned in order and the first fit wins, so triads must stay ahead of the
/// chords that contain them.
pub const CHORD_TEMPLATES: &[ChordTemplate] = &[
    ChordTemplate::new("", &[0, 4, 7]),
    ChordTemplate::new("m", &[0, 3, 7]),
    ChordTemplate::new("dim", &[0, 3, 6]),
    ChordTemplate::new("aug", &[0, 4, 8]),
    ChordTemplate::new("sus2", &[0, 2, 7]),
    ChordTemplate::new("sus4", &[0, 5, 7]),
    ChordTemplate::new("7", &[0, 4, 7, 10]),
    ChordTemplate::new("maj7", &[0, 4, 7, 11]),
    ChordTemplate::new("m7", &[0, 3, 7, 10]),
    ChordTemplate::new("m7b5", &[0, 3, 6, 10]),
    ChordTemplate::new("dim7", &[0, 3, 6, 9]),
    ChordTemplate::new("mMaj7", &[0, 3, 7, 11]),
    ChordTemplate::new("7b5", &[0, 4, 6, 10]),
    ChordTemplate::new("7#5", &[0, 4, 8, 10]),
    ChordTemplate::new("6", &[0, 4, 7, 9]),
    ChordTemplate::new("m6", &[0, 3, 7, 9]),
    ChordTemplate::new("6/9", &[0, 4, 7, 9, 2]),
    ChordTemplate::new("9", &[0, 4, 7, 10, 2]),
    ChordTemplate::new("maj9", &[0, 4, 7, 11, 2]),
    ChordTemplate::new("m9", &[0, 3, 7, 10, 2]),
    ChordTemplate::new("add9", &[0, 4, 7, 2]),
    ChordTemplate::new("madd9", &[0, 3, 7, 2]),
    ChordTemplate::new("11", &[0, 4, 7, 10, 2, 5]),
    ChordTemplate::new("maj11", &[0, 4, 7, 11, 2, 5]),
    ChordTemplate::new("m11", &[0, 3, 7, 10, 2, 5]),
    ChordTemplate::new("7#11", &[0, 4, 7, 10, 2, 6]),
    ChordTemplate::new("13", &[0, 4, 7, 10, 2, 5, 9]),
    ChordTemplate::new("maj13", &[0, 4, 7, 11, 2, 5, 9]),
    ChordTemplate::new("m13", &[0, 3, 7, 10, 2, 5, 9]),
    ChordTemplate::new("7b9", &[0, 4, 7, 10, 1]),
    ChordTemplate::new("7#9", &[0, 4, 7, 10, 3]),
    ChordTemplate::new("7b13", &[0, 4, 7, 10, 2, 8]),
    ChordTemplate::new("alt7", &[0, 4, 6, 10, 1]),
    ChordTemplate::new("7sus2", &[0, 2, 7, 10]),
    ChordTemplate::new("7sus4", &[0, 5, 7, 10]),
    ChordTemplate::new("9sus4", &[0, 5, 7, 10, 2]),
    ChordTemplate::new("m7b9", &[0, 3, 7, 10, 1]),
    ChordTemplate::new("m7#5", &[0, 3, 8, 10]),
    ChordTemplate::new("m9b5", &[0, 3, 6, 10, 2]),
    ChordTemplate::new("7b9#9", &[0, 4, 7, 10, 1, 3]),
    ChordTemplate::new("7b9#11", &[0, 4, 7, 10, 1, 6]),
    ChordTemplate::new("7/6", &[0, 4, 7, 9, 10]),
    ChordTemplate::new("9/13", &[0, 4, 7, 10, 2, 9]),
];

fn interval_mask(intervals: impl IntoIterator<Item = u8>) -> u16 {
    intervals
        .into_iter()
        .fold(0u16, |mask, interval| mask | 1 << (interval % 12))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub root: u8,
    pub label: String,
    /// Note names of the template tones, root first.
    pub notes: Vec<String>,
}

/// Names the chord formed by `pitches`, rooted on the lowest one. `None` means
/// no chord: nothing is sounding or no template fits.
pub fn detect_chord(pitches: impl IntoIterator<Item = u8>, names: &[String]) -> Option<Chord> {
    let mut pitches: Vec<u8> = pitches.into_iter().collect();
    let lowest = *pitches.iter().min()?;
    pitches.sort_unstable();
    pitches.dedup();

    let root = lowest % 12;
    let sounding = interval_mask(pitches.iter().map(|&p| (p - lowest) % 12));
    let sounding_count = sounding.count_ones();

    let template = CHORD_TEMPLATES.iter().find(|template| {
        let mask = template.mask();
        mask & sounding == mask && mask.count_ones() <= sounding_count
    })?;

    let name = |class: u8| names[class as usize % names.len()].clone();
    Some(Chord {
        root,
        label: format!("{}{}", name(root), template.suffix),
        notes: template
            .intervals
            .iter()
            .map(|&interval| name((root + interval) % 12))
            .collect(),
    })
}

/// Measures how long the current chord label has been unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordHold {
    label: Option<String>,
    since: f64,
}

impl ChordHold {
    /// Records the chord seen at `now` and returns how long it has held.
    /// Moving to or from "no chord" counts as a change; "no chord" holds for 0.
    pub fn update(&mut self, chord: Option<&Chord>, now: f64) -> f64 {
        let label = chord.map(|c| c.label.as_str());
        if self.label.as_deref() != label {
            self.label = label.map(str::to_owned);
            self.since = now;
        }
        if self.label.is_some() { now - self.since } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn names() -> Vec<String> {
        Config::default().note_names
    }

    #[test]
    fn test_c_major_triad() {
        let chord = detect_chord([60, 64, 67], &names()).unwrap();
        assert_eq!(chord.label, "C");
        assert_eq!(chord.root, 0);
        assert_eq!(chord.notes, vec!["C", "E", "G"]);
    }

    #[test]
    fn test_nothing_sounding_is_no_chord() {
        assert_eq!(detect_chord([], &names()), None);
    }

    #[test]
    fn test_root_is_lowest_pitch_any_octave() {
        let chord = detect_chord([74, 62, 77, 81], &names()).unwrap();
        assert_eq!(chord.label, "Dm");
        assert_eq!(chord.notes, vec!["D", "F", "A"]);
    }

    #[test]
    fn test_triad_shadows_its_extensions() {
        let chord = detect_chord([60, 64, 67, 70], &names()).unwrap();
        assert_eq!(chord.label, "C");
    }

    #[test]
    fn test_seventh_without_triad() {
        let chord = detect_chord([60, 64, 66, 70], &names()).unwrap();
        assert_eq!(chord.label, "C7b5");
        assert_eq!(chord.notes, vec!["C", "E", "F#", "A#"]);
    }

    #[test]
    fn test_unmatched_set_is_no_chord() {
        // First inversion: rooted on E the intervals are {0, 3, 8}.
        assert_eq!(detect_chord([64, 67, 72], &names()), None);
        assert_eq!(detect_chord([60, 61], &names()), None);
    }

    #[test]
    fn test_doubled_notes_count_once() {
        let chord = detect_chord([57, 60, 64, 69, 72], &names()).unwrap();
        assert_eq!(chord.label, "Am");
    }

    #[test]
    fn test_hold_restarts_on_change() {
        let mut hold = ChordHold::default();
        let c = detect_chord([60, 64, 67], &names());
        let f = detect_chord([65, 69, 72], &names());

        assert_eq!(hold.update(c.as_ref(), 1.0), 0.0);
        assert_eq!(hold.update(c.as_ref(), 1.5), 0.5);
        assert_eq!(hold.update(f.as_ref(), 2.0), 0.0);
        assert_eq!(hold.update(None, 2.5), 0.0);
        assert_eq!(hold.update(f.as_ref(), 3.0), 0.0);
        assert_eq!(hold.update(f.as_ref(), 3.25), 0.25);
    }
}
