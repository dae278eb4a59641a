//! Collision detection and response
//!
//! Each mode has its own contact test (platform landing, center distance,
//! gap window) but all of them answer the same question: did the player touch
//! this object, and what does that do to the run.

use glam::Vec2;

use super::policy::{ContactGeometry, FatalBounds, ModePolicy};
use super::state::{EndCause, GameEvent, GameState, ObjectKind, PlatformKind, PlayerBody, WorldObject};
use crate::consts::TICK_RATE_HZ;
use crate::ms_to_ticks;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    pub fn of_player(player: &PlayerBody) -> Self {
        Self::new(player.pos, player.size)
    }

    pub fn of_object(obj: &WorldObject) -> Self {
        Self::new(obj.pos, obj.size)
    }

    /// Strict overlap; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }
}

/// Downward landing on a platform's top edge
///
/// Only while falling, and only if the foot crossed the top this tick
/// starting no deeper than `band` below it. Side contacts never land.
pub fn landing_contact(player: &PlayerBody, platform: &WorldObject, band: f32) -> bool {
    if player.vel.y <= 0.0 {
        return false;
    }
    if !Aabb::of_player(player).overlaps_x(&Aabb::of_object(platform)) {
        return false;
    }
    let top = platform.pos.y;
    let foot = player.foot();
    let prev_foot = foot - player.vel.y;
    foot >= top && prev_foot <= top + band
}

/// Player is within `band` of a platform (contact guard stays armed)
fn near_platform(player: &PlayerBody, platform: &WorldObject, band: f32) -> bool {
    let zone = Aabb {
        min: platform.pos - Vec2::new(0.0, band),
        max: platform.pos + platform.size,
    };
    Aabb::of_player(player).overlaps(&zone)
}

/// Center-distance test for roundish sprites
pub fn radial_contact(player: &PlayerBody, obj: &WorldObject, scale: f32) -> bool {
    let r_player = player.size.min_element() / 2.0;
    let r_obj = obj.size.min_element() / 2.0;
    let reach = scale * (r_player + r_obj);
    player.center().distance_squared(obj.center()) < reach * reach
}

/// Solid parts of a gap pair (above and below the window)
pub fn gap_solids(obj: &WorldObject, gap_top: f32, gap_bottom: f32) -> [Aabb; 2] {
    let x0 = obj.pos.x;
    let x1 = obj.right();
    [
        Aabb {
            min: Vec2::new(x0, obj.pos.y),
            max: Vec2::new(x1, gap_top),
        },
        Aabb {
            min: Vec2::new(x0, gap_bottom),
            max: Vec2::new(x1, obj.bottom()),
        },
    ]
}

/// Player rectangle against a gap pair's solid regions
pub fn gap_contact(player: &PlayerBody, obj: &WorldObject) -> bool {
    let ObjectKind::GapPair { gap_top, gap_bottom } = obj.kind else {
        return false;
    };
    let player_box = Aabb::of_player(player);
    gap_solids(obj, gap_top, gap_bottom)
        .iter()
        .any(|solid| player_box.overlaps(solid))
}

/// Resolve every contact for this tick. Returns a fatal cause, if any.
pub fn resolve(state: &mut GameState, policy: &ModePolicy) -> Option<EndCause> {
    let fatal = match policy.contact {
        ContactGeometry::Landing { band } => {
            resolve_landings(state, policy, band);
            None
        }
        ContactGeometry::Radial { scale } => resolve_obstacle_hits(state, policy, scale),
        ContactGeometry::GapWindow => resolve_gap_walls(state),
    };
    fatal.or_else(|| check_bounds(state, policy))
}

fn resolve_landings(state: &mut GameState, policy: &ModePolicy, band: f32) {
    let player = state.player.clone();
    let spring_ticks = ms_to_ticks(policy.timers.spring_reset_ms, TICK_RATE_HZ);
    let mut impulse: Option<f32> = None;
    let mut broken: Vec<u32> = Vec::new();

    for obj in &mut state.objects {
        if obj.platform_kind().is_none() {
            continue;
        }
        if !near_platform(&player, obj, band) {
            // Player moved clear: the next landing is a fresh contact
            obj.touching = false;
            continue;
        }
        // One bounce per tick; repeat contact waits for release
        if impulse.is_some() || obj.touching || !landing_contact(&player, obj, band) {
            continue;
        }
        obj.touching = true;

        let id = obj.id;
        let mut breaks = false;
        if let ObjectKind::Platform {
            kind,
            triggered,
            reset_ticks,
        } = &mut obj.kind
        {
            match *kind {
                PlatformKind::Normal => {
                    impulse = Some(policy.impulses.jump);
                    state.events.push(GameEvent::Landed { id, kind: *kind });
                }
                PlatformKind::Spring => {
                    impulse = Some(policy.impulses.spring);
                    *triggered = true;
                    *reset_ticks = spring_ticks;
                    state.events.push(GameEvent::Landed { id, kind: *kind });
                    state.events.push(GameEvent::SpringFired { id });
                }
                PlatformKind::Breakable => {
                    if *triggered {
                        breaks = true;
                    } else {
                        *triggered = true;
                        impulse = Some(policy.impulses.jump);
                        state.events.push(GameEvent::Landed { id, kind: *kind });
                    }
                }
            }
        }
        if breaks && obj.consume() {
            broken.push(id);
            state.events.push(GameEvent::PlatformBroke { id });
        }
    }

    if let Some(vy) = impulse {
        super::physics::apply_impulse(&mut state.player, vy);
    }
    if !broken.is_empty() {
        state.objects.retain(|o| !broken.contains(&o.id));
    }
}

fn resolve_obstacle_hits(state: &mut GameState, policy: &ModePolicy, scale: f32) -> Option<EndCause> {
    if state.hit_cooldown > 0 {
        // Grazed while invulnerable: no life lost, but not avoided either
        for obj in &mut state.objects {
            if matches!(obj.kind, ObjectKind::FallingObstacle { .. })
                && !obj.consumed
                && radial_contact(&state.player, obj, scale)
            {
                obj.touching = true;
            }
        }
        return None;
    }

    let hit = state.objects.iter().position(|o| {
        matches!(o.kind, ObjectKind::FallingObstacle { .. })
            && !o.consumed
            && radial_contact(&state.player, o, scale)
    })?;

    let mut obj = state.objects.remove(hit);
    obj.consume();

    let lives = state.player.lives.unwrap_or(1);
    let left = lives.saturating_sub(1);
    if state.player.lives.is_some() {
        state.player.lives = Some(left);
    }
    if policy.timers.hit_cooldown_ms > 0 {
        state.hit_cooldown = ms_to_ticks(policy.timers.hit_cooldown_ms, TICK_RATE_HZ);
    }
    state.events.push(GameEvent::Hit {
        id: obj.id,
        lives_left: left,
    });
    log::info!("Hit by obstacle {} ({} lives left)", obj.id, left);

    (left == 0).then_some(EndCause::OutOfLives)
}

fn resolve_gap_walls(state: &GameState) -> Option<EndCause> {
    state
        .objects
        .iter()
        .any(|o| gap_contact(&state.player, o))
        .then_some(EndCause::HitWall)
}

/// Fatal play-field boundaries, independent of objects
pub fn check_bounds(state: &GameState, policy: &ModePolicy) -> Option<EndCause> {
    let player = &state.player;
    match policy.fatal {
        FatalBounds::BelowCamera => {
            (player.pos.y > state.camera.y + policy.world.height).then_some(EndCause::Fell)
        }
        FatalBounds::TopBottom => {
            (player.pos.y < 0.0 || player.foot() > policy.world.height)
                .then_some(EndCause::OutOfBounds)
        }
        FatalBounds::None => None,
    }
}
