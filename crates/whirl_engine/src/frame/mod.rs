//! Frame scheduling
//!
//! The scheduler is a two-state machine (stopped, running) that owns the
//! frame clock bookkeeping and a single pending-tick deadline. It never reads
//! a clock itself: callers pass the current time in milliseconds, which keeps
//! the host loop (sleeping, vsync, test clocks) outside this module.

mod scheduler;

pub use scheduler::{FrameScheduler, TickOutcome, TimestepMode};

use serde::Serialize;

/// Frame clock values as seen by update hooks
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    /// Total ticks completed while running
    pub frame_count: u64,
    /// Milliseconds between the two most recent ticks
    pub frame_delta: f64,
    /// Timestamp of the most recent start
    pub start_time: f64,
    /// Sum of each tick's offset from the most recent start
    pub elapsed_time: f64,
}

impl FrameSnapshot {
    /// Frame delta in seconds, the unit most update code integrates with
    pub fn delta_seconds(&self) -> f32 {
        (self.frame_delta / 1000.0) as f32
    }
}
