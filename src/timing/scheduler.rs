use super::Timeline;
use crate::events::{NoteKind, TimelineEvent};

/// A pending note transition falling toward the play line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub pitch: u8,
    pub velocity: u8,
    pub track: usize,
    pub kind: NoteKind,
    /// Rows fallen so far. Reaching `rows - 1` means the block hit the keys.
    pub steps: f64,
    pub spawn_time: f64,
}

impl Block {
    fn spawn(event: &TimelineEvent, now: f64) -> Self {
        Self {
            pitch: event.pitch,
            velocity: event.velocity,
            track: event.track,
            kind: event.kind,
            steps: 0.0,
            spawn_time: now,
        }
    }
}

/// Turns a timeline into falling blocks. Blocks are spawned once their event
/// time is due and land exactly `drop_duration` seconds later.
#[derive(Debug, Clone)]
pub struct BlockScheduler {
    timeline: Timeline,
    cursor: usize,
    blocks: Vec<Block>,
    last_tick: f64,
    drop_duration: f64,
    landing_row: f64,
}

impl BlockScheduler {
    pub fn new(timeline: Timeline, drop_duration: f64, rows: usize) -> Self {
        Self {
            timeline,
            cursor: 0,
            blocks: Vec::new(),
            last_tick: 0.0,
            drop_duration,
            landing_row: rows.saturating_sub(1) as f64,
        }
    }

    /// Spawns every event due at `now`. Returns how many were spawned.
    pub fn admit(&mut self, now: f64) -> usize {
        let events = self.timeline.events();
        let start = self.cursor;
        while self.cursor < events.len() && events[self.cursor].time <= now {
            self.blocks.push(Block::spawn(&events[self.cursor], now));
            self.cursor += 1;
        }
        self.cursor - start
    }

    /// Moves every block by the real time elapsed since the previous call, or
    /// since the block spawned if that is later.
    pub fn advance(&mut self, now: f64) {
        let rate = self.landing_row / self.drop_duration;
        for block in &mut self.blocks {
            let since = self.last_tick.max(block.spawn_time);
            let elapsed = (now - since).max(0.0);
            block.steps += elapsed * rate;
        }
        self.last_tick = self.last_tick.max(now);
    }

    /// Removes and returns the blocks that reached the play line, in spawn
    /// order.
    pub fn take_landed(&mut self) -> Vec<Block> {
        let landing_row = self.landing_row;
        let (landed, falling): (Vec<Block>, Vec<Block>) = self
            .blocks
            .drain(..)
            .partition(|b| b.steps >= landing_row);
        self.blocks = falling;
        landed
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.timeline.len() && self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::{Message, Song, TimedMessage};
    use crate::timing::TempoMode;

    fn scheduler(tracks: Vec<Vec<TimedMessage>>, rows: usize) -> BlockScheduler {
        let song = Song::new("sched", 480, tracks);
        let timeline = Timeline::build(&song, TempoMode::PerTrack, 500_000);
        BlockScheduler::new(timeline, 0.5, rows)
    }

    fn step(s: &mut BlockScheduler, now: f64) -> Vec<Block> {
        s.admit(now);
        s.advance(now);
        s.take_landed()
    }

    #[test]
    fn test_admits_only_due_events() {
        let mut s = scheduler(
            vec![vec![
                TimedMessage::new(0, Message::NoteOn { pitch: 60, velocity: 90 }),
                TimedMessage::new(480, Message::NoteOff { pitch: 60 }),
            ]],
            40,
        );
        assert_eq!(s.admit(0.0), 1);
        assert_eq!(s.admit(0.4), 0);
        assert_eq!(s.admit(0.5), 1);
        assert_eq!(s.blocks().len(), 2);
    }

    #[test]
    fn test_block_lands_after_drop_duration() {
        let mut s = scheduler(
            vec![vec![TimedMessage::new(
                0,
                Message::NoteOn { pitch: 60, velocity: 90 },
            )]],
            40,
        );
        assert!(step(&mut s, 0.0).is_empty());
        assert!(step(&mut s, 0.25).is_empty());
        assert_eq!(s.blocks()[0].steps, 19.5);

        let landed = step(&mut s, 0.5);
        assert_eq!(landed.len(), 1);
        assert_eq!(landed[0].pitch, 60);
        assert!(s.is_finished());
    }

    #[test]
    fn test_new_blocks_do_not_inherit_old_elapsed_time() {
        let mut s = scheduler(
            vec![vec![
                TimedMessage::new(0, Message::NoteOn { pitch: 60, velocity: 90 }),
                TimedMessage::new(240, Message::NoteOn { pitch: 62, velocity: 90 }),
            ]],
            40,
        );
        step(&mut s, 0.0);
        step(&mut s, 0.25);

        let steps: Vec<f64> = s.blocks().iter().map(|b| b.steps).collect();
        assert_eq!(steps, vec![19.5, 0.0]);
    }

    #[test]
    fn test_steps_never_decrease_and_each_block_lands_once() {
        let mut tracks = vec![Vec::new(), Vec::new()];
        for i in 0..20u32 {
            tracks[(i % 2) as usize].push(TimedMessage::new(
                37 * (i % 5),
                Message::NoteOn { pitch: 40 + i as u8, velocity: 80 },
            ));
        }
        let mut s = scheduler(tracks, 12);
        let total = s.timeline().len();

        let mut landed = Vec::new();
        let mut previous: Vec<(u8, f64)> = Vec::new();
        let mut now = 0.0;
        // Irregular loop latency.
        let mut jitter = [0.003, 0.017, 0.041, 0.009, 0.026].iter().cycle();
        while !s.is_finished() {
            s.admit(now);
            s.advance(now);
            for block in s.blocks() {
                if let Some((_, before)) = previous.iter().find(|(p, _)| *p == block.pitch) {
                    assert!(block.steps >= *before);
                }
            }
            previous = s.blocks().iter().map(|b| (b.pitch, b.steps)).collect();
            landed.extend(s.take_landed());
            now += jitter.next().unwrap();
        }

        let mut pitches: Vec<u8> = landed.iter().map(|b| b.pitch).collect();
        pitches.sort();
        pitches.dedup();
        assert_eq!(landed.len(), total);
        assert_eq!(pitches.len(), total);
    }
}
