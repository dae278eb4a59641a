//! Game state and core simulation types
//!
//! Everything a run mutates lives here. The only thing that outlives a run
//! is the best score, which the engine owns.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::policy::{GameMode, ModePolicy};

/// Current phase of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for an explicit start
    Idle,
    /// Active gameplay
    Playing,
    /// Simulation suspended; only unpause/quit are processed
    Paused,
    /// Run ended, waiting for reset
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    /// Lives reached zero
    OutOfLives,
    /// Touched the solid part of a gap pair
    HitWall,
    /// Fell below the camera
    Fell,
    /// Left the play field through the top or bottom wall
    OutOfBounds,
    /// Player quit from the pause screen
    Quit,
}

/// Platform variants (jumper mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Normal,
    /// Super-jump, reusable
    Spring,
    /// Bounces once, breaks on the second landing
    Breakable,
}

/// Kind-specific data of a world object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    Platform {
        kind: PlatformKind,
        /// Spring: fired recently. Breakable: already landed on once.
        triggered: bool,
        /// Ticks until a spring's `triggered` flag clears
        reset_ticks: u32,
    },
    FallingObstacle {
        /// Downward speed per tick
        speed: f32,
    },
    GapPair {
        /// Top edge of the open window
        gap_top: f32,
        /// Bottom edge of the open window
        gap_bottom: f32,
    },
}

/// An interactive environment entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: ObjectKind,
    /// One-way guard: scored, hit or broken. Never cleared.
    pub consumed: bool,
    /// Player is still in contact from an earlier resolution
    #[serde(skip)]
    pub touching: bool,
}

impl WorldObject {
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn platform_kind(&self) -> Option<PlatformKind> {
        match self.kind {
            ObjectKind::Platform { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self.kind, ObjectKind::Platform { triggered: true, .. })
    }

    /// Mark as consumed. Returns false if it already was.
    pub fn consume(&mut self) -> bool {
        if self.consumed {
            return false;
        }
        self.consumed = true;
        true
    }
}

/// The player's body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBody {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Remaining lives (modes that use them)
    pub lives: Option<u8>,
    /// Cosmetic facing multiplier (-1 left, 1 right)
    pub facing: f32,
    /// Platform the player stands on before the first jump
    pub resting_on: Option<u32>,
}

impl PlayerBody {
    pub fn new(policy: &ModePolicy) -> Self {
        Self {
            pos: Vec2::new(policy.player.start_x, policy.player.start_y),
            vel: Vec2::ZERO,
            size: Vec2::new(policy.player.width, policy.player.height),
            lives: policy.player.max_lives,
            facing: 1.0,
            resting_on: None,
        }
    }

    pub fn foot(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// Something that happened during a tick (sounds, particles, HUD flashes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Landed { id: u32, kind: PlatformKind },
    SpringFired { id: u32 },
    PlatformBroke { id: u32 },
    Hit { id: u32, lives_left: u8 },
    ObstacleAvoided { id: u32 },
    GapPassed { id: u32 },
    RoundUp { round: u32 },
    GameOver { cause: EndCause, score: u64 },
}

/// Complete state of one mini-game session
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: GameMode,
    pub phase: GamePhase,
    /// Seed of the current run
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Ticks simulated in the current run
    pub time_ticks: u64,
    pub player: PlayerBody,
    /// Live world objects, sorted by id
    pub objects: Vec<WorldObject>,
    /// Coordinate of the last generated object along the advance axis
    pub frontier: f32,
    /// Top-left of the visible window in world space
    pub camera: Vec2,
    pub score: u64,
    /// Difficulty counter, starts at 1
    pub round: u32,
    /// Per-run score multiplier (the fish being played)
    pub multiplier: u32,
    /// Ticks during which obstacle hits are ignored
    pub hit_cooldown: u32,
    pub end_cause: Option<EndCause>,
    /// Events produced by the most recent tick
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an idle state with an empty world
    pub fn new(policy: &ModePolicy, seed: u64) -> Self {
        Self {
            mode: policy.mode,
            phase: GamePhase::Idle,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            player: PlayerBody::new(policy),
            objects: Vec::new(),
            frontier: 0.0,
            camera: Vec2::ZERO,
            score: 0,
            round: 1,
            multiplier: policy.scoring.multiplier.max(1),
            hit_cooldown: 0,
            end_cause: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Reinitialize everything for a new run. The id counter keeps counting.
    pub fn reset_for_run(&mut self, policy: &ModePolicy, seed: u64) {
        let next_id = self.next_id;
        let multiplier = self.multiplier;
        *self = Self::new(policy, seed);
        self.next_id = next_id;
        self.multiplier = multiplier;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an object and return its id
    pub fn spawn_object(&mut self, kind: ObjectKind, pos: Vec2, size: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.objects.push(WorldObject {
            id,
            pos,
            size,
            kind,
            consumed: false,
            touching: false,
        });
        id
    }

    pub fn object(&self, id: u32) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Ensure objects are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.objects.sort_by_key(|o| o.id);
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}
