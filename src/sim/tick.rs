//! Fixed timestep simulation tick
//!
//! Phase order inside a tick never changes:
//! physics -> generation -> collision -> scoring -> state check.
//! Collision reads the positions physics just produced, and scoring reads
//! what collision and pruning did in the same tick.

use super::collision::{self, Aabb};
use super::generate;
use super::physics::{self, HorizontalInput};
use super::policy::ModePolicy;
use super::scoring;
use super::state::{EndCause, GameEvent, GamePhase, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Held horizontal direction
    pub horizontal: HorizontalInput,
    /// Jump/tap this tick
    pub jump: bool,
}

/// Idle -> Playing: fresh player, fresh world, score/lives/round reset
pub fn start_run(state: &mut GameState, policy: &ModePolicy, seed: u64) -> bool {
    if state.phase != GamePhase::Idle {
        return false;
    }
    state.reset_for_run(policy, seed);
    generate::seed_world(state, policy);
    state.phase = GamePhase::Playing;
    log::info!("{} run started (seed {})", policy.mode.as_str(), seed);
    true
}

/// Playing <-> Paused. Returns true if the phase changed.
pub fn toggle_pause(state: &mut GameState) -> bool {
    match state.phase {
        GamePhase::Playing => {
            state.phase = GamePhase::Paused;
            true
        }
        GamePhase::Paused => {
            state.phase = GamePhase::Playing;
            true
        }
        _ => false,
    }
}

/// Freeze the run
pub fn end_run(state: &mut GameState, cause: EndCause) {
    state.phase = GamePhase::GameOver;
    state.end_cause = Some(cause);
    state.events.push(GameEvent::GameOver {
        cause,
        score: state.score,
    });
    log::info!("Game over: {:?}, score {}", cause, state.score);
}

/// GameOver -> Idle with everything reinitialized
pub fn reset_to_idle(state: &mut GameState, policy: &ModePolicy) -> bool {
    if state.phase != GamePhase::GameOver {
        return false;
    }
    let seed = state.seed;
    state.reset_for_run(policy, seed);
    true
}

/// Top edge of the platform the player rests on, if it still supports them
fn support_top(state: &mut GameState) -> Option<f32> {
    let id = state.player.resting_on?;
    let player_box = Aabb::of_player(&state.player);
    let top = state
        .object(id)
        .filter(|p| player_box.overlaps_x(&Aabb::of_object(p)))
        .map(|p| p.pos.y);
    if top.is_none() {
        // Walked off the edge
        state.player.resting_on = None;
    }
    top
}

/// Advance the game state by one tick. Returns the end cause if the run ended.
pub fn tick(state: &mut GameState, policy: &ModePolicy, input: &TickInput) -> Option<EndCause> {
    // Don't tick unless playing
    if state.phase != GamePhase::Playing {
        return None;
    }

    state.events.clear();
    state.time_ticks += 1;

    if input.jump {
        physics::try_jump(state, policy);
    }

    // Physics
    physics::advance_objects(state, policy);
    let support = support_top(state);
    physics::integrate_player(
        &mut state.player,
        &policy.motion,
        &policy.world,
        input.horizontal,
        support,
    );

    // Generation
    generate::follow_camera(state, policy);
    let retired = generate::prune(state, policy);
    generate::extend(state, policy);

    // Collision
    let fatal = collision::resolve(state, policy);

    // Scoring
    scoring::update(state, policy, &retired);

    // State check
    let ended = fatal.or_else(|| (state.player.lives == Some(0)).then_some(EndCause::OutOfLives));
    if let Some(cause) = ended {
        end_run(state, cause);
    }

    // Ensure deterministic ordering
    state.normalize_order();
    ended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::policy::GameMode;
    use crate::sim::state::ObjectKind;
    use glam::Vec2;

    fn playing(mode: GameMode, seed: u64) -> (GameState, ModePolicy) {
        let policy = ModePolicy::preset(mode);
        let mut state = GameState::new(&policy, seed);
        assert!(start_run(&mut state, &policy, seed));
        (state, policy)
    }

    #[test]
    fn test_tick_idle_is_noop() {
        let policy = ModePolicy::preset(GameMode::Jumper);
        let mut state = GameState::new(&policy, 1);
        let before = state.player.clone();
        assert_eq!(tick(&mut state, &policy, &TickInput::default()), None);
        assert_eq!(state.player, before);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_tick_pause() {
        let (mut state, policy) = playing(GameMode::Flyer, 5);
        tick(&mut state, &policy, &TickInput::default());
        assert!(toggle_pause(&mut state));
        assert_eq!(state.phase, GamePhase::Paused);

        let player = state.player.clone();
        let objects = state.objects.clone();
        for _ in 0..30 {
            tick(&mut state, &policy, &TickInput::default());
        }
        assert_eq!(state.player, player);
        assert_eq!(state.objects, objects);

        assert!(toggle_pause(&mut state));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_start_only_from_idle() {
        let (mut state, policy) = playing(GameMode::Dodge, 1);
        assert!(!start_run(&mut state, &policy, 2));
        assert!(!reset_to_idle(&mut state, &policy));
        end_run(&mut state, EndCause::Quit);
        assert!(!toggle_pause(&mut state));
        assert!(reset_to_idle(&mut state, &policy));
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.objects.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_jumper_rest_then_jump() {
        let (mut state, policy) = playing(GameMode::Jumper, 11);
        for _ in 0..10 {
            tick(&mut state, &policy, &TickInput::default());
        }
        assert_eq!(state.score, 0);
        assert_eq!(state.player.foot(), policy.player.start_y + policy.player.height);

        assert!(physics::try_jump(&mut state, &policy));
        assert_eq!(state.player.vel.y, policy.impulses.jump);

        let y_prev = state.player.pos.y;
        let x_prev = state.player.pos.x;
        tick(&mut state, &policy, &TickInput::default());
        let vy_new = policy.impulses.jump + policy.motion.gravity;
        assert_eq!(state.player.vel.y, vy_new);
        assert_eq!(state.player.pos.y, y_prev + vy_new);
        assert_eq!(state.player.pos.x, x_prev);
        assert_eq!(state.player.vel.x, 0.0);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_dodge_overlap_costs_one_life() {
        let (mut state, policy) = playing(GameMode::Dodge, 3);
        let id = state.spawn_object(
            ObjectKind::FallingObstacle { speed: 0.0 },
            state.player.pos,
            Vec2::new(40.0, 40.0),
        );
        tick(&mut state, &policy, &TickInput::default());
        assert_eq!(state.player.lives, Some(2));
        assert!(state.object(id).is_none());
        for _ in 0..2 {
            tick(&mut state, &policy, &TickInput::default());
        }
        assert_eq!(state.player.lives, Some(2));
    }

    #[test]
    fn test_dodge_last_life_ends_same_tick() {
        let (mut state, policy) = playing(GameMode::Dodge, 3);
        state.player.lives = Some(1);
        state.spawn_object(
            ObjectKind::FallingObstacle { speed: 0.0 },
            state.player.pos,
            Vec2::new(40.0, 40.0),
        );
        assert_eq!(
            tick(&mut state, &policy, &TickInput::default()),
            Some(EndCause::OutOfLives)
        );
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.lives, Some(0));
    }

    #[test]
    fn test_flyer_gap_scores_once() {
        let (mut state, policy) = playing(GameMode::Flyer, 8);
        // Replace the generated field with one hand-placed gap pair
        state.objects.clear();
        let player_x = state.player.pos.x;
        let id = state.spawn_object(
            ObjectKind::GapPair {
                gap_top: 150.0,
                gap_bottom: 450.0,
            },
            Vec2::new(player_x - 60.0 + 1.0, 0.0),
            Vec2::new(60.0, policy.world.height),
        );
        state.frontier = player_x + policy.lookahead + 1000.0;
        state.player.pos.y = 280.0;
        state.player.vel.y = -1.0;

        // Scroll moves the right edge behind the player
        tick(&mut state, &policy, &TickInput::default());
        assert_eq!(state.score, 1);
        assert!(state.object(id).unwrap().consumed);

        tick(&mut state, &policy, &TickInput::default());
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_flyer_falls_out_without_taps() {
        let (mut state, policy) = playing(GameMode::Flyer, 2);
        let mut ended = None;
        for _ in 0..200 {
            ended = tick(&mut state, &policy, &TickInput::default());
            if ended.is_some() {
                break;
            }
        }
        assert_eq!(ended, Some(EndCause::OutOfBounds));
        assert_eq!(state.end_cause, Some(EndCause::OutOfBounds));
    }

    #[test]
    fn test_determinism() {
        let (mut a, policy) = playing(GameMode::Jumper, 99_999);
        let (mut b, _) = playing(GameMode::Jumper, 99_999);
        let inputs = [
            TickInput {
                jump: true,
                ..Default::default()
            },
            TickInput {
                horizontal: HorizontalInput::Left,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for _ in 0..60 {
            for input in &inputs {
                tick(&mut a, &policy, input);
                tick(&mut b, &policy, input);
            }
        }
        assert_eq!(a.player, b.player);
        assert_eq!(a.objects, b.objects);
        assert_eq!(a.score, b.score);
    }
}
