mod scheduler;
mod tempo;
mod timeline;

pub use scheduler::{Block, BlockScheduler};
pub use tempo::{TempoMap, TempoMode, ticks_to_seconds};
pub use timeline::Timeline;
