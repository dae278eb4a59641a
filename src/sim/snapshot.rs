//! Render snapshot
//!
//! An immutable copy of everything a presentation layer needs for one frame.
//! The engine never reaches into presentation; hosts poll this instead.

use glam::Vec2;
use serde::Serialize;

use super::policy::{GameMode, WorldSpec};
use super::state::{EndCause, GameEvent, GamePhase, GameState, WorldObject};

/// Player pose for drawing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPose {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub facing: f32,
}

/// One frame of game state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub mode: GameMode,
    pub phase: GamePhase,
    pub tick: u64,
    pub player: PlayerPose,
    /// Top-left of the visible window in world space
    pub camera: Vec2,
    /// Live world objects, sorted by id
    pub objects: Vec<WorldObject>,
    pub score: u64,
    pub best_score: u64,
    pub round: u32,
    pub lives: Option<u8>,
    /// Obstacle hits are currently ignored (blink the sprite)
    pub invulnerable: bool,
    pub end_cause: Option<EndCause>,
    /// What happened during the last tick
    pub events: Vec<GameEvent>,
}

impl Snapshot {
    pub fn capture(state: &GameState, best_score: u64) -> Self {
        Self {
            mode: state.mode,
            phase: state.phase,
            tick: state.time_ticks,
            player: PlayerPose {
                pos: state.player.pos,
                vel: state.player.vel,
                size: state.player.size,
                facing: state.player.facing,
            },
            camera: state.camera,
            objects: state.objects.clone(),
            score: state.score,
            best_score,
            round: state.round,
            lives: state.player.lives,
            invulnerable: state.hit_cooldown > 0,
            end_cause: state.end_cause,
            events: state.events.clone(),
        }
    }

    /// Objects that intersect the camera window
    pub fn visible_objects<'a>(&'a self, world: &'a WorldSpec) -> impl Iterator<Item = &'a WorldObject> + 'a {
        let min = self.camera;
        let max = self.camera + Vec2::new(world.width, world.height);
        self.objects.iter().filter(move |o| {
            o.pos.x < max.x && o.right() > min.x && o.pos.y < max.y && o.bottom() > min.y
        })
    }
}
