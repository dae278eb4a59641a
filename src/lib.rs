//! Aqua Arcade - the mini-game engine behind the aquarium's arcade corner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, generation, collisions, scoring)
//! - `clock`: Fixed timestep accumulator and cancellable frame scheduler
//! - `engine`: State machine, collaborators and render snapshots
//! - `highscores`: Best score persistence
//! - `settings`: Data-driven configuration

pub mod clock;
pub mod collaborators;
pub mod engine;
pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{FixedTimestep, FrameOutcome, FrameRequest, Scheduler};
pub use collaborators::{BestScoreStore, MemoryBestScoreStore, NullSubmitter, ScoreSubmitter};
pub use engine::{Engine, Notice};
pub use error::{SettingsError, StoreError, SubmitError};
pub use highscores::BestScores;
#[cfg(not(target_arch = "wasm32"))]
pub use highscores::FileBestScoreStore;
pub use settings::Settings;
pub use sim::{EndCause, GameMode, GamePhase, HorizontalInput, ModePolicy, Snapshot, TickInput};

/// Engine-wide constants
pub mod consts {
    /// Default simulation rate. Per-tick velocities in the mode presets are tuned for it.
    pub const TICK_RATE_HZ: u32 = 60;
    /// Maximum ticks run for a single frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Starting lives for modes that use them
    pub const START_LIVES: u8 = 3;
    /// Spawn budget for one generation pass; grows when the lookahead needs more
    pub const MAX_SPAWNS_PER_PASS: usize = 64;
}

/// Convert a duration in milliseconds to a whole number of ticks (at least one)
#[inline]
pub fn ms_to_ticks(ms: u32, tick_rate_hz: u32) -> u32 {
    let ticks = (ms as u64 * tick_rate_hz as u64).div_ceil(1000);
    (ticks as u32).max(1)
}
