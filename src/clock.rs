//! Clock and frame scheduler
//!
//! The host owns real time. Each display frame it hands us a monotonic
//! timestamp; we turn elapsed time into a whole number of fixed ticks.
//! Every scheduled frame carries the epoch it was issued in, so a callback
//! that arrives after stop/teardown is recognized as stale and runs nothing.

use crate::consts::{MAX_SUBSTEPS, TICK_RATE_HZ};

/// Fixed timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Duration of one tick
    step_ms: f64,
    /// Time not yet consumed by ticks
    accumulator_ms: f64,
    /// Max ticks per frame to prevent spiral of death
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(tick_rate_hz: u32, max_steps: u32) -> Self {
        Self {
            step_ms: 1000.0 / tick_rate_hz.max(1) as f64,
            accumulator_ms: 0.0,
            max_steps: max_steps.max(1),
        }
    }

    /// Add frame time to the accumulator. Returns the number of ticks to run.
    pub fn accumulate(&mut self, frame_ms: f64) -> u32 {
        self.accumulator_ms += frame_ms.max(0.0);
        self.accumulator_ms = self.accumulator_ms.min(self.step_ms * self.max_steps as f64);
        let steps = (self.accumulator_ms / self.step_ms) as u32;
        self.accumulator_ms -= steps as f64 * self.step_ms;
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
    }
}

/// Token for one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    epoch: u64,
}

/// What happened when a frame callback was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Ticks were run; schedule `next` if present
    Ran {
        ticks: u32,
        next: Option<FrameRequest>,
    },
    /// The request was stale (stopped, restarted or torn down)
    Cancelled,
}

/// Cancellable frame loop driven by host timestamps
#[derive(Debug, Clone)]
pub struct Scheduler {
    clock: FixedTimestep,
    epoch: u64,
    running: bool,
    torn_down: bool,
    last_timestamp_ms: Option<f64>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(TICK_RATE_HZ, MAX_SUBSTEPS)
    }
}

impl Scheduler {
    pub fn new(tick_rate_hz: u32, max_steps: u32) -> Self {
        Self {
            clock: FixedTimestep::new(tick_rate_hz, max_steps),
            epoch: 0,
            running: false,
            torn_down: false,
            last_timestamp_ms: None,
        }
    }

    /// Start (or restart) the loop. Any request issued earlier becomes stale.
    pub fn start(&mut self) -> Option<FrameRequest> {
        if self.torn_down {
            return None;
        }
        self.epoch += 1;
        self.running = true;
        self.last_timestamp_ms = None;
        self.clock.reset();
        Some(FrameRequest { epoch: self.epoch })
    }

    /// Stop the loop and cancel the pending request
    pub fn stop(&mut self) {
        if self.running {
            self.epoch += 1;
            self.running = false;
        }
    }

    /// Stop for good; `start` is refused afterwards
    pub fn teardown(&mut self) {
        self.stop();
        self.torn_down = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// The request a host should currently have scheduled
    pub fn pending(&self) -> Option<FrameRequest> {
        self.running.then_some(FrameRequest { epoch: self.epoch })
    }

    /// Accept a frame callback. Returns the ticks to run, or None if stale.
    ///
    /// The first frame after a start only sets the time baseline.
    pub fn begin_frame(&mut self, request: FrameRequest, now_ms: f64) -> Option<u32> {
        if !self.running || request.epoch != self.epoch {
            return None;
        }
        let elapsed = match self.last_timestamp_ms.replace(now_ms) {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        Some(self.clock.accumulate(elapsed))
    }
}
