//! Demo-mode autopilot
//!
//! A simple controller that reads the state and produces the input a player
//! would. Good enough to keep an attract screen alive, not to win.

use super::physics::HorizontalInput;
use super::policy::{ModePolicy, ObjectFamily};
use super::state::{GameState, ObjectKind, PlatformKind};
use super::tick::TickInput;

/// Dead zone for steering toward a target x
const STEER_DEADZONE: f32 = 6.0;

/// Decide this tick's input
pub fn decide(state: &GameState, policy: &ModePolicy) -> TickInput {
    match policy.spawn.family {
        ObjectFamily::Platforms => climb(state, policy),
        ObjectFamily::FallingObstacles => dodge(state, policy),
        ObjectFamily::GapPairs => fly(state),
    }
}

fn steer_toward(from_x: f32, to_x: f32) -> HorizontalInput {
    let dx = to_x - from_x;
    if dx.abs() < STEER_DEADZONE {
        HorizontalInput::None
    } else if dx < 0.0 {
        HorizontalInput::Left
    } else {
        HorizontalInput::Right
    }
}

fn climb(state: &GameState, policy: &ModePolicy) -> TickInput {
    let player = &state.player;
    if player.resting_on.is_some() {
        return TickInput {
            jump: true,
            ..Default::default()
        };
    }

    let foot = player.foot();
    // Apex of a normal jump from here
    let reach = policy.impulses.jump * policy.impulses.jump / (2.0 * policy.motion.gravity);

    // Falling: aim for the nearest platform below the feet.
    // Rising: aim for the highest platform still in reach.
    let candidates = state.objects.iter().filter(|o| match o.kind {
        ObjectKind::Platform { kind, triggered, .. } => {
            !(kind == PlatformKind::Breakable && triggered)
        }
        _ => false,
    });
    let target = if player.vel.y > 0.0 {
        candidates
            .filter(|o| o.pos.y >= foot)
            .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
    } else {
        candidates
            .filter(|o| o.pos.y >= foot - reach && o.pos.y < foot)
            .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
    };

    TickInput {
        horizontal: target
            .map(|t| steer_toward(player.center().x, t.center().x))
            .unwrap_or_default(),
        jump: false,
    }
}

fn dodge(state: &GameState, policy: &ModePolicy) -> TickInput {
    let player = &state.player;
    let center = player.center();
    let margin = player.size.x;

    let threat = state
        .objects
        .iter()
        .filter(|o| !o.consumed && matches!(o.kind, ObjectKind::FallingObstacle { .. }))
        .filter(|o| o.bottom() > player.pos.y - 200.0 && o.pos.y < player.foot())
        .filter(|o| (o.center().x - center.x).abs() < (o.size.x + player.size.x) / 2.0 + margin)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let horizontal = match threat {
        Some(o) => {
            let go_right = o.center().x < center.x;
            let room_right = policy.world.width - (player.pos.x + player.size.x) > margin;
            let room_left = player.pos.x > margin;
            match (go_right, room_right, room_left) {
                (true, true, _) | (false, _, false) => HorizontalInput::Right,
                _ => HorizontalInput::Left,
            }
        }
        None => steer_toward(center.x, policy.world.width / 2.0),
    };

    TickInput {
        horizontal,
        jump: false,
    }
}

fn fly(state: &GameState) -> TickInput {
    let player = &state.player;
    let center = player.center();

    let next_gap = state
        .objects
        .iter()
        .filter(|o| o.right() >= player.pos.x)
        .find_map(|o| match o.kind {
            ObjectKind::GapPair { gap_top, gap_bottom } => Some((gap_top + gap_bottom) / 2.0),
            _ => None,
        });

    let target_y = next_gap.unwrap_or(300.0);
    TickInput {
        horizontal: HorizontalInput::None,
        jump: center.y > target_y + 10.0 && player.vel.y >= 0.0,
    }
}
