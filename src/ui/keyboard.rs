use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::config::Config;

/// Semitones of slack added on each side of a song's pitch range.
pub const RANGE_MARGIN: u8 = 3;

pub fn is_black_key(pitch: u8) -> bool {
    matches!(pitch % 12, 1 | 3 | 6 | 8 | 10)
}

/// Pitch window to show: the observed range plus margin, widened around its
/// center to at least `min_span` keys. Falls back to the default window when
/// nothing was observed.
pub fn keyboard_window(observed: Option<(u8, u8)>, default: (u8, u8), min_span: u8) -> (u8, u8) {
    let Some((lo, hi)) = observed else {
        return default;
    };
    let mut lo = lo.saturating_sub(RANGE_MARGIN) as i32;
    let mut hi = hi.saturating_add(RANGE_MARGIN).min(127) as i32;

    let min_count = (min_span as i32).min(128);
    let count = hi - lo + 1;
    if count < min_count {
        let pad = min_count - count;
        lo -= pad / 2;
        hi += pad - pad / 2;
        if lo < 0 {
            hi -= lo;
            lo = 0;
        }
        if hi > 127 {
            lo = (lo - (hi - 127)).max(0);
            hi = 127;
        }
    }
    (lo as u8, hi as u8)
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardLayout {
    min_pitch: u8,
    max_pitch: u8,
    columns: BTreeMap<u8, usize>,
    width: usize,
}

impl KeyboardLayout {
    pub fn new(min_pitch: u8, max_pitch: u8, whole_step: usize, half_step: usize) -> Self {
        let mut columns = BTreeMap::new();
        let mut pos = 0;
        for pitch in min_pitch..=max_pitch {
            columns.insert(pitch, pos);
            pos += if is_black_key(pitch) { half_step } else { whole_step };
        }
        Self {
            min_pitch,
            max_pitch,
            columns,
            width: pos + 1,
        }
    }

    pub fn for_song(observed: Option<(u8, u8)>, config: &Config) -> Self {
        let (lo, hi) = keyboard_window(
            observed,
            (config.min_note, config.max_note),
            config.min_span,
        );
        tracing::debug!("Keyboard window {}..={}", lo, hi);
        Self::new(lo, hi, config.whole_step, config.half_step)
    }

    pub fn column(&self, pitch: u8) -> Option<usize> {
        self.columns.get(&pitch).copied()
    }

    /// Pitch and column of every key, left to right.
    pub fn keys(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.columns.iter().map(|(&pitch, &col)| (pitch, col))
    }

    pub fn range(&self) -> RangeInclusive<u8> {
        self.min_pitch..=self.max_pitch
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_defaults_without_notes() {
        assert_eq!(keyboard_window(None, (48, 84), 72), (48, 84));
    }

    #[test]
    fn test_narrow_range_is_centered_to_six_octaves() {
        // 60..=64 plus margin is 57..=67 (11 keys); needs 72.
        let (lo, hi) = keyboard_window(Some((60, 64)), (48, 84), 72);
        assert_eq!((lo, hi), (27, 98));
        assert_eq!(hi - lo + 1, 72);
    }

    #[test]
    fn test_minimum_span_is_configurable() {
        assert_eq!(keyboard_window(Some((60, 64)), (48, 84), 37), (44, 80));
    }

    #[test]
    fn test_wide_range_only_gets_margin() {
        assert_eq!(keyboard_window(Some((30, 100)), (48, 84), 72), (27, 103));
    }

    #[test]
    fn test_window_is_clamped_to_midi_range() {
        assert_eq!(keyboard_window(Some((0, 2)), (48, 84), 72), (0, 71));
        assert_eq!(keyboard_window(Some((125, 127)), (48, 84), 72), (56, 127));
    }

    #[test]
    fn test_layout_for_song_uses_configured_span() {
        let layout = KeyboardLayout::for_song(Some((60, 64)), &Config::default());
        assert_eq!(layout.range(), 27..=98);
        assert_eq!(KeyboardLayout::for_song(None, &Config::default()).range(), 48..=84);
    }

    #[test]
    fn test_columns_follow_step_widths() {
        let layout = KeyboardLayout::new(60, 64, 2, 1);
        // C C# D D# E
        assert_eq!(layout.column(60), Some(0));
        assert_eq!(layout.column(61), Some(2));
        assert_eq!(layout.column(62), Some(3));
        assert_eq!(layout.column(63), Some(5));
        assert_eq!(layout.column(64), Some(6));
        assert_eq!(layout.width(), 9);
        assert_eq!(layout.column(65), None);
    }

    #[test]
    fn test_unit_steps_are_one_column_per_key() {
        let layout = KeyboardLayout::new(48, 84, 1, 1);
        assert_eq!(layout.width(), 38);
        assert_eq!(layout.range(), 48..=84);
        assert_eq!(layout.keys().count(), 37);
    }
}
