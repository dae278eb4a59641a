//! Physics integrator
//!
//! Arcade physics, not physically exact: per-tick velocities, gravity added
//! unconditionally, exponential horizontal damping for a slippery feel.

use serde::{Deserialize, Serialize};

use super::policy::{EdgePolicy, JumpRule, ModePolicy, MotionPolicy, ObjectFamily, WorldSpec};
use super::state::{GameState, ObjectKind, PlatformKind, PlayerBody};

/// Horizontal speed below which damping snaps to zero
pub const MIN_HORIZONTAL_SPEED: f32 = 0.01;

/// Held horizontal input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalInput {
    #[default]
    None,
    Left,
    Right,
}

impl HorizontalInput {
    pub fn sign(self) -> f32 {
        match self {
            HorizontalInput::None => 0.0,
            HorizontalInput::Left => -1.0,
            HorizontalInput::Right => 1.0,
        }
    }
}

/// Advance the player body by one tick
///
/// `support_top` is the top edge of a platform the player is resting on; the
/// body is held on it instead of falling through.
pub fn integrate_player(
    player: &mut PlayerBody,
    motion: &MotionPolicy,
    world: &WorldSpec,
    input: HorizontalInput,
    support_top: Option<f32>,
) {
    // Horizontal: accelerate toward the cap, or decay toward zero
    if motion.horizontal_accel > 0.0 && input != HorizontalInput::None {
        let max = motion.max_horizontal_speed;
        player.vel.x = (player.vel.x + input.sign() * motion.horizontal_accel).clamp(-max, max);
    } else {
        player.vel.x *= motion.damping;
        if player.vel.x.abs() < MIN_HORIZONTAL_SPEED {
            player.vel.x = 0.0;
        }
    }

    // Vertical: gravity every tick
    player.vel.y += motion.gravity;

    player.pos += player.vel;

    apply_edges(player, motion.edges, world.width);

    if motion.floor && player.foot() > world.height {
        player.pos.y = world.height - player.size.y;
        player.vel.y = 0.0;
    }

    if let Some(top) = support_top {
        if player.foot() >= top {
            player.pos.y = top - player.size.y;
            player.vel.y = 0.0;
        }
    }
}

/// Wrap or clamp at the horizontal world bounds
pub fn apply_edges(player: &mut PlayerBody, edges: EdgePolicy, width: f32) {
    match edges {
        EdgePolicy::Wrap => {
            let center = player.pos.x + player.size.x / 2.0;
            if center < 0.0 {
                player.pos.x += width;
            } else if center >= width {
                player.pos.x -= width;
            }
        }
        EdgePolicy::Clamp => {
            let max_x = width - player.size.x;
            if player.pos.x < 0.0 {
                player.pos.x = 0.0;
                player.vel.x = 0.0;
            } else if player.pos.x > max_x {
                player.pos.x = max_x;
                player.vel.x = 0.0;
            }
        }
    }
}

/// Overwrite vertical velocity
#[inline]
pub fn apply_impulse(player: &mut PlayerBody, impulse: f32) {
    player.vel.y = impulse;
}

/// Handle a jump/tap input. Returns true if it was honored.
pub fn try_jump(state: &mut GameState, policy: &ModePolicy) -> bool {
    match policy.impulses.rule {
        JumpRule::Never => false,
        JumpRule::Anytime => {
            apply_impulse(&mut state.player, policy.impulses.jump);
            true
        }
        JumpRule::FromRest => {
            if state.player.resting_on.take().is_some() {
                apply_impulse(&mut state.player, policy.impulses.jump);
                true
            } else {
                false
            }
        }
    }
}

/// Fall speed (obstacles) or scroll speed (gap pairs) for a round
pub fn world_speed(policy: &ModePolicy, round: u32) -> f32 {
    policy.spawn.base_speed + policy.spawn.speed_per_round * round.saturating_sub(1) as f32
}

/// Move world objects and count down per-object and global timers
pub fn advance_objects(state: &mut GameState, policy: &ModePolicy) {
    state.hit_cooldown = state.hit_cooldown.saturating_sub(1);

    let scroll = world_speed(policy, state.round);
    for obj in &mut state.objects {
        match &mut obj.kind {
            ObjectKind::Platform {
                kind,
                triggered,
                reset_ticks,
            } => {
                if *reset_ticks > 0 {
                    *reset_ticks -= 1;
                    if *reset_ticks == 0 && *kind == PlatformKind::Spring {
                        *triggered = false;
                    }
                }
            }
            ObjectKind::FallingObstacle { speed } => obj.pos.y += *speed,
            ObjectKind::GapPair { .. } => obj.pos.x -= scroll,
        }
    }

    // The spawn cursor travels with the content it was placed against
    match policy.spawn.family {
        ObjectFamily::Platforms => {}
        ObjectFamily::FallingObstacles => state.frontier += scroll,
        ObjectFamily::GapPairs => state.frontier -= scroll,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::policy::GameMode;
    use glam::Vec2;

    fn body(policy: &ModePolicy) -> PlayerBody {
        PlayerBody::new(policy)
    }

    #[test]
    fn test_gravity_accumulates() {
        let policy = ModePolicy::preset(GameMode::Flyer);
        let mut player = body(&policy);
        let y0 = player.pos.y;
        integrate_player(&mut player, &policy.motion, &policy.world, HorizontalInput::None, None);
        integrate_player(&mut player, &policy.motion, &policy.world, HorizontalInput::None, None);
        let g = policy.motion.gravity;
        assert!((player.vel.y - 2.0 * g).abs() < 1e-5);
        assert!((player.pos.y - (y0 + 3.0 * g)).abs() < 1e-4);
    }

    #[test]
    fn test_input_accelerates_to_cap() {
        let policy = ModePolicy::preset(GameMode::Jumper);
        let mut player = body(&policy);
        for _ in 0..100 {
            integrate_player(&mut player, &policy.motion, &policy.world, HorizontalInput::Right, None);
        }
        assert_eq!(player.vel.x, policy.motion.max_horizontal_speed);
    }

    #[test]
    fn test_damping_decays_without_hard_stop() {
        let policy = ModePolicy::preset(GameMode::Jumper);
        let mut player = body(&policy);
        player.vel.x = 5.0;
        integrate_player(&mut player, &policy.motion, &policy.world, HorizontalInput::None, None);
        assert!((player.vel.x - 5.0 * policy.motion.damping).abs() < 1e-5);
        for _ in 0..200 {
            integrate_player(&mut player, &policy.motion, &policy.world, HorizontalInput::None, None);
        }
        assert_eq!(player.vel.x, 0.0);
    }

    #[test]
    fn test_jumper_wraps_horizontally() {
        let policy = ModePolicy::preset(GameMode::Jumper);
        let mut player = body(&policy);
        player.pos.x = -30.0;
        apply_edges(&mut player, EdgePolicy::Wrap, policy.world.width);
        assert_eq!(player.pos.x, policy.world.width - 30.0);

        player.pos.x = policy.world.width - 5.0;
        apply_edges(&mut player, EdgePolicy::Wrap, policy.world.width);
        assert_eq!(player.pos.x, -5.0);
    }

    #[test]
    fn test_dodge_clamps_and_stands_on_floor() {
        let policy = ModePolicy::preset(GameMode::Dodge);
        let mut player = body(&policy);
        player.pos.x = 2.0;
        player.vel.x = -8.0;
        integrate_player(&mut player, &policy.motion, &policy.world, HorizontalInput::Left, None);
        assert_eq!(player.pos.x, 0.0);
        assert_eq!(player.vel.x, 0.0);
        assert_eq!(player.foot(), policy.world.height);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_support_holds_player() {
        let policy = ModePolicy::preset(GameMode::Jumper);
        let mut player = body(&policy);
        let top = player.foot();
        for _ in 0..10 {
            integrate_player(&mut player, &policy.motion, &policy.world, HorizontalInput::None, Some(top));
        }
        assert_eq!(player.foot(), top);
        assert_eq!(player.vel, Vec2::ZERO);
    }

    #[test]
    fn test_jump_rules() {
        let dodge = ModePolicy::preset(GameMode::Dodge);
        let mut state = GameState::new(&dodge, 1);
        assert!(!try_jump(&mut state, &dodge));
        assert_eq!(state.player.vel.y, 0.0);

        let jumper = ModePolicy::preset(GameMode::Jumper);
        let mut state = GameState::new(&jumper, 1);
        // Airborne: no jump
        assert!(!try_jump(&mut state, &jumper));
        state.player.resting_on = Some(1);
        assert!(try_jump(&mut state, &jumper));
        assert_eq!(state.player.vel.y, jumper.impulses.jump);
        assert_eq!(state.player.resting_on, None);
    }

    #[test]
    fn test_spring_flag_clears_after_countdown() {
        let policy = ModePolicy::preset(GameMode::Jumper);
        let mut state = GameState::new(&policy, 1);
        let id = state.spawn_object(
            ObjectKind::Platform {
                kind: PlatformKind::Spring,
                triggered: true,
                reset_ticks: 2,
            },
            Vec2::new(0.0, 100.0),
            Vec2::new(70.0, 15.0),
        );
        advance_objects(&mut state, &policy);
        assert!(state.object(id).unwrap().is_triggered());
        advance_objects(&mut state, &policy);
        assert!(!state.object(id).unwrap().is_triggered());
    }
}
