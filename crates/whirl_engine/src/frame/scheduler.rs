use super::FrameSnapshot;
use crate::events::{names, EventData, EventError, EventHub};
use serde::{Deserialize, Serialize};

/// Intervals a fixed-step clock may fall behind before it resynchronises
const MAX_CATCH_UP_FRAMES: f64 = 5.0;

/// How the deadline of the next tick is derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestepMode {
    /// Next tick is due one interval after the current one ran
    #[default]
    Variable,
    /// Ticks stay on a grid anchored at the start time
    Fixed,
}

/// What a tick left scheduled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Another tick is due at the given timestamp
    Scheduled(f64),
    /// The tick was the last one after a stop request
    Stopped,
    /// Nothing was scheduled, so no tick ran
    Idle,
}

/// Drives the update/render cycle and its timing bookkeeping
///
/// All timestamps are milliseconds on the caller's clock.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    running: bool,
    frame_count: u64,
    frame_rate: f64,
    frame_delta: f64,
    last_delta: f64,
    start_time: f64,
    elapsed_time: f64,
    init_time: f64,
    next_tick: Option<f64>,
    timestep: TimestepMode,
}

impl FrameScheduler {
    /// Create a stopped scheduler; `init_time` is reported by the start events
    pub fn new(init_time: f64, frame_rate: f64, timestep: TimestepMode) -> Self {
        Self {
            running: false,
            frame_count: 0,
            frame_rate,
            frame_delta: 0.0,
            last_delta: 0.0,
            start_time: 0.0,
            elapsed_time: 0.0,
            init_time,
            next_tick: None,
            timestep,
        }
    }

    /// Begin ticking.
    ///
    /// Does nothing when already running. Otherwise `willStart` fires before
    /// any state changes and `didStart` after; the first tick is due at `now`.
    /// The clock is started even if a start listener fails.
    pub fn start(&mut self, hub: &mut EventHub, now: f64) -> Result<(), EventError> {
        if self.running {
            return Ok(());
        }

        let before = hub.emit(
            names::WILL_START,
            EventData::new().with("initTime", self.init_time),
        );

        self.running = true;
        self.start_time = now;
        self.elapsed_time = 0.0;
        self.next_tick = Some(now);
        log::info!("Frame clock started at {now:.2}ms ({} fps)", self.frame_rate);

        let after = hub.emit(
            names::DID_START,
            EventData::new()
                .with("initTime", self.init_time)
                .with("startTime", self.start_time),
        );

        before.and(after)
    }

    /// Request a stop.
    ///
    /// Only clears the running flag: the tick already scheduled still runs
    /// and emits `didStop`.
    pub fn stop(&mut self, hub: &mut EventHub) -> Result<(), EventError> {
        let result = hub.emit(
            names::WILL_STOP,
            EventData::new()
                .with("startTime", self.start_time)
                .with("elapsedTime", self.elapsed_time),
        );

        self.running = false;
        log::info!("Frame clock stop requested after {} frames", self.frame_count);
        result
    }

    /// Whether a tick is pending and its deadline has passed
    pub fn is_due(&self, now: f64) -> bool {
        self.next_tick.is_some_and(|due| now >= due)
    }

    /// Run one tick at `now`.
    ///
    /// `willUpdate` carries the values from before the bookkeeping and
    /// `didUpdate` the values after it; `pass` runs in between. Bookkeeping,
    /// the pass and rescheduling all happen even when a listener or the pass
    /// fails; the first failure is returned afterwards.
    pub fn tick<E, F>(&mut self, hub: &mut EventHub, now: f64, pass: F) -> Result<TickOutcome, E>
    where
        E: From<EventError>,
        F: FnOnce(&FrameSnapshot) -> Result<(), E>,
    {
        let Some(due) = self.next_tick.take() else {
            log::warn!("Tick requested with nothing scheduled");
            return Ok(TickOutcome::Idle);
        };

        let mut first_error: Option<E> = None;
        let mut keep = |result: Result<(), E>| {
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        };

        keep(hub.emit(names::WILL_UPDATE, self.update_data()).map_err(E::from));

        self.frame_count += 1;
        // Sums each tick's offset from the start, not the span since it.
        self.elapsed_time += now - self.start_time;
        self.frame_delta = now - self.last_delta;
        self.last_delta = now;
        log::trace!("Frame {} ({:.2}ms)", self.frame_count, self.frame_delta);

        keep(pass(&self.snapshot()));

        keep(hub.emit(names::DID_UPDATE, self.update_data()).map_err(E::from));

        let outcome = if self.running {
            let next = self.next_deadline(due, now);
            self.next_tick = Some(next);
            TickOutcome::Scheduled(next)
        } else {
            log::info!("Frame clock stopped after {} frames", self.frame_count);
            keep(
                hub.emit(
                    names::DID_STOP,
                    EventData::new()
                        .with("frameCount", self.frame_count)
                        .with("startTime", self.start_time)
                        .with("elapsedTime", self.elapsed_time),
                )
                .map_err(E::from),
            );
            TickOutcome::Stopped
        };

        match first_error {
            Some(err) => Err(err),
            None => Ok(outcome),
        }
    }

    fn next_deadline(&self, due: f64, now: f64) -> f64 {
        let interval = self.frame_interval();
        match self.timestep {
            TimestepMode::Variable => now + interval,
            TimestepMode::Fixed => {
                let next = due + interval;
                if now - next > interval * MAX_CATCH_UP_FRAMES {
                    log::debug!("Fixed timestep fell behind by {:.2}ms, resynchronising", now - next);
                    now + interval
                } else {
                    next
                }
            }
        }
    }

    fn update_data(&self) -> EventData {
        EventData::new()
            .with("frameCount", self.frame_count)
            .with("frameDelta", self.frame_delta)
            .with("startTime", self.start_time)
            .with("elapsedTime", self.elapsed_time)
    }

    /// Current clock values
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame_count: self.frame_count,
            frame_delta: self.frame_delta,
            start_time: self.start_time,
            elapsed_time: self.elapsed_time,
        }
    }

    /// Milliseconds between ticks at the target frame rate
    pub fn frame_interval(&self) -> f64 {
        1000.0 / self.frame_rate
    }

    /// Change the target frame rate; applies from the next scheduled tick
    pub fn set_frame_rate(&mut self, frame_rate: f64) {
        self.frame_rate = frame_rate;
    }

    /// Whether ticks are being scheduled
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks run since construction; survives restarts
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Target ticks per second
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Milliseconds between the two most recent ticks
    pub fn frame_delta(&self) -> f64 {
        self.frame_delta
    }

    /// Timestamp of the most recent tick
    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }

    /// Timestamp of the most recent start
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Sum of each tick's offset from the most recent start
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    /// Timestamp the scheduler was created with
    pub fn init_time(&self) -> f64 {
        self.init_time
    }

    /// Deadline of the pending tick, if any
    pub fn next_tick(&self) -> Option<f64> {
        self.next_tick
    }

    /// How the next deadline is derived
    pub fn timestep(&self) -> TimestepMode {
        self.timestep
    }
}
