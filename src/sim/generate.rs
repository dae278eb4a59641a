//! World generator
//!
//! Objects are placed relative to the last generated one (the frontier), not
//! to the player, so spacing stays uniform whatever the player's speed. The
//! generator runs until the frontier is a full lookahead past the reference
//! position, plus one spacing of slack.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::physics::world_speed;
use super::policy::{ModePolicy, ObjectFamily, SpawnWeights};
use super::state::{GameState, ObjectKind, PlatformKind, WorldObject};
use crate::consts::MAX_SPAWNS_PER_PASS;

/// Uniform draw in `[lo, hi]`
fn draw(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * rng.random::<f32>()
}

/// Weighted platform kind draw
pub fn draw_platform_kind(rng: &mut Pcg32, weights: &SpawnWeights) -> PlatformKind {
    let roll = rng.random::<f32>() * weights.total();
    if roll < weights.spring {
        PlatformKind::Spring
    } else if roll < weights.spring + weights.breakable {
        PlatformKind::Breakable
    } else {
        PlatformKind::Normal
    }
}

/// Spacing range between consecutive objects for a round
pub fn spacing_range(policy: &ModePolicy, round: u32) -> (f32, f32) {
    let spawn = &policy.spawn;
    let shift = spawn.spacing_per_round * round.saturating_sub(1) as f32;
    let (mut lo, mut hi) = (spawn.spacing_min + shift, spawn.spacing_max + shift);
    if spawn.spacing_per_round >= 0.0 {
        lo = lo.min(spawn.spacing_limit);
        hi = hi.min(spawn.spacing_limit);
    } else {
        lo = lo.max(spawn.spacing_limit);
        hi = hi.max(spawn.spacing_limit);
    }
    let lo = lo.max(1.0);
    (lo, hi.max(lo))
}

/// Random x inside the lane inset from both world edges
fn lane_x(rng: &mut Pcg32, policy: &ModePolicy) -> f32 {
    let inset = policy.spawn.lane_inset;
    let max_x = policy.world.width - inset - policy.spawn.object_width;
    draw(rng, inset, max_x.max(inset))
}

/// How far generated content reaches past the reference position
///
/// The reference is the camera top for vertical modes (never below the
/// player) and the player's x for the flyer.
pub fn lookahead_reach(state: &GameState, policy: &ModePolicy) -> f32 {
    match policy.spawn.family {
        ObjectFamily::Platforms => state.camera.y.min(state.player.pos.y) - state.frontier,
        ObjectFamily::FallingObstacles => state.camera.y - state.frontier,
        ObjectFamily::GapPairs => state.frontier - state.player.pos.x,
    }
}

pub fn lookahead_satisfied(state: &GameState, policy: &ModePolicy) -> bool {
    lookahead_reach(state, policy) >= policy.lookahead
}

/// Jumper camera only ever moves up
pub fn follow_camera(state: &mut GameState, policy: &ModePolicy) {
    if policy.spawn.family == ObjectFamily::Platforms {
        let target = state.player.pos.y - policy.camera_lead;
        if target < state.camera.y {
            state.camera.y = target;
        }
    }
}

fn spawn_platform(state: &mut GameState, policy: &ModePolicy, y: f32) {
    let kind = draw_platform_kind(&mut state.rng, &policy.spawn.weights);
    let x = lane_x(&mut state.rng, policy);
    let id = state.spawn_object(
        ObjectKind::Platform {
            kind,
            triggered: false,
            reset_ticks: 0,
        },
        Vec2::new(x, y),
        Vec2::new(policy.spawn.object_width, policy.spawn.object_height),
    );
    state.frontier = y;
    log::debug!("Spawned {:?} platform {} at ({:.1}, {:.1})", kind, id, x, y);
}

fn spawn_obstacle(state: &mut GameState, policy: &ModePolicy, y: f32) {
    let speed = world_speed(policy, state.round);
    let x = lane_x(&mut state.rng, policy);
    let id = state.spawn_object(
        ObjectKind::FallingObstacle { speed },
        Vec2::new(x, y),
        Vec2::new(policy.spawn.object_width, policy.spawn.object_height),
    );
    state.frontier = y;
    log::debug!("Spawned obstacle {} at ({:.1}, {:.1}) speed {:.2}", id, x, y, speed);
}

fn spawn_gap_pair(state: &mut GameState, policy: &ModePolicy, x: f32) {
    let spawn = &policy.spawn;
    let gap = draw(&mut state.rng, spawn.gap_min, spawn.gap_max);
    let max_top = (policy.world.height - spawn.gap_margin - gap).max(spawn.gap_margin);
    let gap_top = draw(&mut state.rng, spawn.gap_margin, max_top);
    let id = state.spawn_object(
        ObjectKind::GapPair {
            gap_top,
            gap_bottom: gap_top + gap,
        },
        Vec2::new(x, 0.0),
        Vec2::new(spawn.object_width, policy.world.height),
    );
    state.frontier = x;
    log::debug!("Spawned gap pair {} at x={:.1} window {:.1}..{:.1}", id, x, gap_top, gap_top + gap);
}

/// Seed the world for a fresh run, before the first tick
pub fn seed_world(state: &mut GameState, policy: &ModePolicy) {
    state.objects.clear();
    state.camera = Vec2::ZERO;

    match policy.spawn.family {
        ObjectFamily::Platforms => {
            // Start platform directly under the player
            let w = policy.spawn.object_width;
            let inset = policy.spawn.lane_inset;
            let x = (state.player.center().x - w / 2.0).clamp(inset, policy.world.width - inset - w);
            let top = state.player.foot();
            let id = state.spawn_object(
                ObjectKind::Platform {
                    kind: PlatformKind::Normal,
                    triggered: false,
                    reset_ticks: 0,
                },
                Vec2::new(x, top),
                Vec2::new(w, policy.spawn.object_height),
            );
            state.player.resting_on = Some(id);
            state.frontier = top;
        }
        ObjectFamily::FallingObstacles => {
            let y = -policy.spawn.initial_offset - policy.spawn.object_height;
            spawn_obstacle(state, policy, y);
        }
        ObjectFamily::GapPairs => {
            let x = state.player.pos.x + policy.spawn.initial_offset;
            spawn_gap_pair(state, policy, x);
        }
    }

    let spawned = extend(state, policy);
    log::info!(
        "Seeded {} world with {} objects",
        policy.mode.as_str(),
        spawned + 1
    );
}

/// Generate until the frontier is comfortably past the lookahead.
/// Returns the number of objects spawned.
pub fn extend(state: &mut GameState, policy: &ModePolicy) -> usize {
    let mut spawned = 0;
    let (lo, slack) = spacing_range(policy, state.round);
    let wanted = policy.lookahead + slack;
    // Every spawn advances the reach by at least `lo`
    let missing = (wanted - lookahead_reach(state, policy)).max(0.0);
    let budget = MAX_SPAWNS_PER_PASS.max((missing / lo).ceil() as usize + 1);

    while lookahead_reach(state, policy) < wanted && spawned < budget {
        let (lo, hi) = spacing_range(policy, state.round);
        let gap = draw(&mut state.rng, lo, hi);
        let frontier = state.frontier;
        match policy.spawn.family {
            ObjectFamily::Platforms => spawn_platform(state, policy, frontier - gap),
            ObjectFamily::FallingObstacles => spawn_obstacle(state, policy, frontier - gap),
            ObjectFamily::GapPairs => spawn_gap_pair(state, policy, frontier + gap),
        }
        spawned += 1;
    }

    if !lookahead_satisfied(state, policy) {
        log::error!(
            "Generation underflow: reach {:.1} < lookahead {:.1}",
            lookahead_reach(state, policy),
            policy.lookahead
        );
        debug_assert!(false, "generation underflow");
    }

    spawned
}

/// Remove objects that left the relevant part of the view.
/// Returns them so scoring can count what was avoided.
pub fn prune(state: &mut GameState, policy: &ModePolicy) -> Vec<WorldObject> {
    let view_bottom = state.camera.y + policy.world.height;
    let view_left = state.camera.x;
    let family = policy.spawn.family;

    let (retired, kept): (Vec<_>, Vec<_>) =
        std::mem::take(&mut state.objects)
            .into_iter()
            .partition(|obj| match family {
                ObjectFamily::Platforms | ObjectFamily::FallingObstacles => obj.pos.y > view_bottom,
                ObjectFamily::GapPairs => obj.right() < view_left,
            });
    state.objects = kept;

    if !retired.is_empty() {
        log::debug!("Pruned {} objects", retired.len());
    }
    retired
}
