//! Game engine
//!
//! Owns one mode's state machine, the frame scheduler and the collaborators.
//! Hosts feed it inputs and frame timestamps and read snapshots back.

use serde::Serialize;

use crate::clock::{FrameOutcome, FrameRequest, Scheduler};
use crate::collaborators::{BestScoreStore, ScoreSubmitter};
use crate::consts::{MAX_SUBSTEPS, TICK_RATE_HZ};
use crate::error::SettingsError;
use crate::settings::Settings;
use crate::sim::physics::{self, HorizontalInput};
use crate::sim::tick::{self as sim_tick, TickInput};
use crate::sim::{EndCause, GameMode, GamePhase, GameState, ModePolicy, Snapshot};

/// Non-fatal problem reported to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// Best score could not be read at startup; playing with 0
    BestScoreUnavailable(String),
    /// New best score could not be persisted
    BestScoreNotSaved(String),
    /// Final score could not be submitted
    ScoreNotSubmitted(String),
}

/// One mini-game session
pub struct Engine {
    policy: ModePolicy,
    state: GameState,
    /// Held horizontal direction
    input: HorizontalInput,
    scheduler: Scheduler,
    submitter: Box<dyn ScoreSubmitter>,
    store: Box<dyn BestScoreStore>,
    best_score: u64,
    base_seed: u64,
    /// Runs started so far
    runs: u64,
    /// Current run's score has been handled
    finalized: bool,
    notices: Vec<Notice>,
}

impl Engine {
    /// Create an idle engine. Reads the best score once.
    pub fn new(
        policy: ModePolicy,
        seed: u64,
        submitter: Box<dyn ScoreSubmitter>,
        mut store: Box<dyn BestScoreStore>,
    ) -> Result<Self, SettingsError> {
        policy.validate()?;

        let mut notices = Vec::new();
        let best_score = match store.load_best_score() {
            Ok(best) => best,
            Err(e) => {
                log::warn!("Could not load best score: {}", e);
                notices.push(Notice::BestScoreUnavailable(e.to_string()));
                0
            }
        };

        Ok(Self {
            state: GameState::new(&policy, seed),
            policy,
            input: HorizontalInput::None,
            scheduler: Scheduler::new(TICK_RATE_HZ, MAX_SUBSTEPS),
            submitter,
            store,
            best_score,
            base_seed: seed,
            runs: 0,
            finalized: false,
            notices,
        })
    }

    /// Create an engine from loaded settings
    pub fn from_settings(
        settings: &Settings,
        seed: u64,
        submitter: Box<dyn ScoreSubmitter>,
        store: Box<dyn BestScoreStore>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut engine = Self::new(settings.policy()?, seed, submitter, store)?;
        engine.scheduler = Scheduler::new(TICK_RATE_HZ, settings.max_substeps);
        Ok(engine)
    }

    pub fn mode(&self) -> GameMode {
        self.policy.mode
    }

    pub fn policy(&self) -> &ModePolicy {
        &self.policy
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Best score across all runs, including the stored one
    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for hosts and tests that stage a scene
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.best_score)
    }

    /// Drain queued notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // === Inputs ===

    /// Idle -> Playing. Returns the first frame request to schedule.
    pub fn start(&mut self) -> Option<FrameRequest> {
        if self.scheduler.is_torn_down() {
            log::warn!("start ignored: engine torn down");
            return None;
        }
        let seed = self.run_seed();
        if !sim_tick::start_run(&mut self.state, &self.policy, seed) {
            return None;
        }
        self.runs += 1;
        self.finalized = false;
        self.input = HorizontalInput::None;
        self.scheduler.start()
    }

    /// Playing <-> Paused. Returns the frame request to schedule on resume.
    pub fn toggle_pause(&mut self) -> Option<FrameRequest> {
        if !sim_tick::toggle_pause(&mut self.state) {
            return None;
        }
        match self.state.phase {
            GamePhase::Paused => {
                self.scheduler.stop();
                self.input = HorizontalInput::None;
                log::info!("Paused at tick {}", self.state.time_ticks);
                None
            }
            _ => {
                log::info!("Resumed");
                self.scheduler.start()
            }
        }
    }

    /// Paused -> GameOver. Returns true if the run ended.
    pub fn quit(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }
        sim_tick::end_run(&mut self.state, EndCause::Quit);
        self.finish_run();
        true
    }

    /// GameOver -> Idle
    pub fn reset(&mut self) -> bool {
        if !sim_tick::reset_to_idle(&mut self.state, &self.policy) {
            return false;
        }
        self.scheduler.stop();
        self.input = HorizontalInput::None;
        true
    }

    pub fn set_horizontal_input(&mut self, direction: HorizontalInput) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        self.input = direction;
        if direction != HorizontalInput::None {
            self.state.player.facing = direction.sign();
        }
    }

    /// Jump (Jumper) or flap (Flyer). Returns true if honored.
    pub fn jump(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        physics::try_jump(&mut self.state, &self.policy)
    }

    pub fn tap(&mut self) -> bool {
        self.jump()
    }

    /// Score multiplier for the next run (the fish picked). Idle only.
    pub fn set_score_multiplier(&mut self, multiplier: u32) -> bool {
        if self.state.phase != GamePhase::Idle || multiplier == 0 {
            return false;
        }
        self.state.multiplier = multiplier;
        true
    }

    // === Time ===

    /// Run one tick with the held input. Returns the end cause if the run ended.
    pub fn step(&mut self) -> Option<EndCause> {
        self.step_with(TickInput {
            horizontal: self.input,
            jump: false,
        })
    }

    /// Run one tick with an explicit input (autopilot, replays)
    pub fn step_with(&mut self, input: TickInput) -> Option<EndCause> {
        let ended = sim_tick::tick(&mut self.state, &self.policy, &input);
        if ended.is_some() {
            self.finish_run();
        }
        ended
    }

    /// Deliver a scheduled frame with the host's monotonic timestamp
    pub fn on_frame(&mut self, request: FrameRequest, now_ms: f64) -> FrameOutcome {
        let Some(due) = self.scheduler.begin_frame(request, now_ms) else {
            return FrameOutcome::Cancelled;
        };
        let mut ticks = 0;
        while ticks < due && self.state.is_playing() {
            self.step();
            ticks += 1;
        }
        FrameOutcome::Ran {
            ticks,
            next: self.scheduler.pending(),
        }
    }

    /// Whether the frame loop is live
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// The frame request the host should currently have scheduled
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.scheduler.pending()
    }

    /// Stop for good. Frames delivered afterwards run nothing.
    pub fn teardown(&mut self) {
        self.scheduler.teardown();
        log::info!("{} engine torn down", self.policy.mode.as_str());
    }

    // === Internals ===

    fn run_seed(&self) -> u64 {
        self.base_seed
            .wrapping_add(self.runs.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Game over bookkeeping: best score, then submission, each at most once
    fn finish_run(&mut self) {
        self.scheduler.stop();
        self.input = HorizontalInput::None;
        if self.finalized {
            return;
        }
        self.finalized = true;

        let score = self.state.score;
        if score > self.best_score {
            self.best_score = score;
            log::info!("New best score: {}", score);
            if let Err(e) = self.store.save_best_score(score) {
                log::warn!("Could not save best score: {}", e);
                self.notices.push(Notice::BestScoreNotSaved(e.to_string()));
            }
        }

        if score > 0 {
            let game_type = self.policy.mode.game_type();
            if let Err(e) = self.submitter.submit_score(game_type, score) {
                log::warn!("Could not submit score {} for {}: {}", score, game_type, e);
                self.notices.push(Notice::ScoreNotSubmitted(e.to_string()));
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("mode", &self.policy.mode)
            .field("phase", &self.state.phase)
            .field("score", &self.state.score)
            .field("best_score", &self.best_score)
            .field("runs", &self.runs)
            .finish_non_exhaustive()
    }
}
