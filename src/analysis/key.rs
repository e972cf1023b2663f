#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Major,
    Minor,
}

pub const MAJOR_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
pub const MINOR_STEPS: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleTemplate {
    pub tonic: u8,
    pub mode: Mode,
    pub classes: [u8; 7],
}

impl ScaleTemplate {
    pub fn new(tonic: u8, mode: Mode) -> Self {
        let steps = match mode {
            Mode::Major => MAJOR_STEPS,
            Mode::Minor => MINOR_STEPS,
        };
        Self {
            tonic,
            mode,
            classes: steps.map(|step| (tonic + step) % 12),
        }
    }

    pub fn score(&self, histogram: &[u32; 12]) -> u32 {
        self.classes.iter().map(|&c| histogram[c as usize]).sum()
    }
}

/// The twelve major scales followed by the twelve minor ones, by tonic.
pub fn scale_templates() -> Vec<ScaleTemplate> {
    [Mode::Major, Mode::Minor]
        .into_iter()
        .flat_map(|mode| (0..12).map(move |tonic| ScaleTemplate::new(tonic, mode)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEstimate {
    pub tonic: u8,
    pub mode: Mode,
    /// Raw count of notes that fall inside the scale.
    pub score: u32,
}

pub fn pitch_class_histogram(pitches: impl IntoIterator<Item = u8>) -> [u32; 12] {
    let mut histogram = [0u32; 12];
    for pitch in pitches {
        histogram[(pitch % 12) as usize] += 1;
    }
    histogram
}

/// Best-scoring scale. Within a mode the lowest tonic wins a tie; between the
/// best major and best minor, major wins a tie.
pub fn detect_key(histogram: &[u32; 12]) -> KeyEstimate {
    let best = |mode| {
        (0..12)
            .map(|tonic| ScaleTemplate::new(tonic, mode))
            .fold(None::<(ScaleTemplate, u32)>, |best, template| {
                let score = template.score(histogram);
                match best {
                    Some((_, top)) if top >= score => best,
                    _ => Some((template, score)),
                }
            })
    };

    let candidates = [best(Mode::Major), best(Mode::Minor)];
    let (template, score) = match candidates {
        [Some(major), Some(minor)] if minor.1 > major.1 => minor,
        [Some(major), _] => major,
        _ => (ScaleTemplate::new(0, Mode::Major), 0),
    };
    KeyEstimate {
        tonic: template.tonic,
        mode: template.mode,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_have_seven_distinct_classes() {
        let templates = scale_templates();
        assert_eq!(templates.len(), 24);
        for template in templates {
            let mut classes = template.classes.to_vec();
            classes.sort();
            classes.dedup();
            assert_eq!(classes.len(), 7);
        }
    }

    #[test]
    fn test_c_major_scale_detects_c_major() {
        let pitches = [60, 62, 64, 65, 67, 69, 71].repeat(4);
        let histogram = pitch_class_histogram(pitches);
        let key = detect_key(&histogram);

        assert_eq!(key.tonic, 0);
        assert_eq!(key.mode, Mode::Major);
        assert_eq!(key.score, 28);
        let max = scale_templates()
            .iter()
            .map(|t| t.score(&histogram))
            .max()
            .unwrap();
        assert_eq!(key.score, max);
    }

    #[test]
    fn test_relative_minor_tie_prefers_major() {
        // A natural minor has the same classes as C major.
        let histogram = pitch_class_histogram([57, 59, 60, 62, 64, 65, 67]);
        let key = detect_key(&histogram);
        assert_eq!(key.mode, Mode::Major);
        assert_eq!(key.tonic, 0);
    }

    #[test]
    fn test_c_minor_material_reports_relative_major() {
        let histogram = pitch_class_histogram([60, 63, 67, 68, 70, 60, 63, 67]);
        let key = detect_key(&histogram);
        assert_eq!((key.tonic, key.mode, key.score), (3, Mode::Major, 8));
    }

    #[test]
    fn test_every_minor_shares_classes_with_a_major() {
        let templates = scale_templates();
        for minor in templates.iter().filter(|t| t.mode == Mode::Minor) {
            let mut classes = minor.classes;
            classes.sort();
            assert!(templates.iter().any(|major| {
                let mut other = major.classes;
                other.sort();
                major.mode == Mode::Major && other == classes
            }));
        }
    }

    #[test]
    fn test_empty_histogram_is_c_major_zero() {
        let key = detect_key(&[0; 12]);
        assert_eq!((key.tonic, key.mode, key.score), (0, Mode::Major, 0));
    }
}
