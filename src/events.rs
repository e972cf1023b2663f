#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    On,
    Off,
}

/// One note transition at an absolute time (seconds from file start).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineEvent {
    pub time: f64,
    pub kind: NoteKind,
    pub pitch: u8,
    pub velocity: u8,
    pub track: usize,
}

/// What gets written to an output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteCommand {
    NoteOn { pitch: u8, velocity: u8 },
    NoteOff { pitch: u8 },
}

impl NoteCommand {
    /// Raw channel-1 MIDI bytes.
    pub fn to_bytes(self) -> [u8; 3] {
        match self {
            NoteCommand::NoteOn { pitch, velocity } => [0x90, pitch & 0x7F, velocity & 0x7F],
            NoteCommand::NoteOff { pitch } => [0x80, pitch & 0x7F, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_command_bytes() {
        assert_eq!(
            NoteCommand::NoteOn { pitch: 60, velocity: 100 }.to_bytes(),
            [0x90, 60, 100]
        );
        assert_eq!(NoteCommand::NoteOff { pitch: 60 }.to_bytes(), [0x80, 60, 0]);
    }
}
