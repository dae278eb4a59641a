//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One tick per call, velocities in units per tick
//! - Seeded RNG only, no wall-clock reads
//! - Stable iteration order (by entity ID)
//! - No rendering, platform or collaborator dependencies

pub mod autopilot;
pub mod collision;
pub mod generate;
pub mod physics;
pub mod policy;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use physics::HorizontalInput;
pub use policy::{
    ContactGeometry, EdgePolicy, FatalBounds, GameMode, JumpRule, ModePolicy, ObjectFamily,
    ScoreRule, SpawnWeights,
};
pub use snapshot::{PlayerPose, Snapshot};
pub use state::{
    EndCause, GameEvent, GamePhase, GameState, ObjectKind, PlatformKind, PlayerBody, WorldObject,
};
pub use tick::{TickInput, tick};
