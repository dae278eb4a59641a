//! Scoring and progression
//!
//! Round is the only thing scoring feeds back into generation.

use super::policy::{ModePolicy, ScoreRule};
use super::state::{GameEvent, GameState, ObjectKind, WorldObject};

/// Round for a score: starts at 1, +1 per `round_every` points
pub fn round_for_score(score: u64, round_every: u64) -> u32 {
    let every = round_every.max(1);
    (1 + score / every).min(u32::MAX as u64) as u32
}

/// Points for the best height reached
pub fn height_points(start_y: f32, y: f32, units_per_point: f32, multiplier: u32) -> u64 {
    let climbed = (start_y - y).max(0.0);
    (climbed / units_per_point).floor() as u64 * multiplier as u64
}

/// Apply this tick's score changes. `retired` holds objects pruned this tick.
pub fn update(state: &mut GameState, policy: &ModePolicy, retired: &[WorldObject]) {
    match policy.scoring.rule {
        ScoreRule::Height { units_per_point } => {
            let points = height_points(
                policy.player.start_y,
                state.player.pos.y,
                units_per_point,
                state.multiplier,
            );
            state.score = state.score.max(points);
        }
        ScoreRule::Avoided => {
            for obj in retired {
                if matches!(obj.kind, ObjectKind::FallingObstacle { .. })
                    && !obj.consumed
                    && !obj.touching
                {
                    state.score += 1;
                    state.events.push(GameEvent::ObstacleAvoided { id: obj.id });
                }
            }
        }
        ScoreRule::GapsPassed => {
            let player_x = state.player.pos.x;
            for obj in &mut state.objects {
                if matches!(obj.kind, ObjectKind::GapPair { .. })
                    && player_x > obj.right()
                    && obj.consume()
                {
                    state.score += 1;
                    state.events.push(GameEvent::GapPassed { id: obj.id });
                }
            }
        }
    }

    advance_round(state, policy);
}

fn advance_round(state: &mut GameState, policy: &ModePolicy) {
    let round = round_for_score(state.score, policy.scoring.round_every);
    if round > state.round {
        state.round = round;
        state.events.push(GameEvent::RoundUp { round });
        log::info!("Round {} (score {})", round, state.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::policy::GameMode;
    use glam::Vec2;

    #[test]
    fn test_round_for_score() {
        assert_eq!(round_for_score(0, 10), 1);
        assert_eq!(round_for_score(9, 10), 1);
        assert_eq!(round_for_score(10, 10), 2);
        assert_eq!(round_for_score(25, 10), 3);
        assert_eq!(round_for_score(5, 0), 6);
    }

    #[test]
    fn test_height_points() {
        assert_eq!(height_points(480.0, 480.0, 10.0, 1), 0);
        assert_eq!(height_points(480.0, 500.0, 10.0, 1), 0);
        assert_eq!(height_points(480.0, 375.0, 10.0, 1), 10);
        assert_eq!(height_points(480.0, 375.0, 10.0, 3), 30);
    }

    #[test]
    fn test_height_score_never_drops() {
        let policy = ModePolicy::preset(GameMode::Jumper);
        let mut state = GameState::new(&policy, 1);
        state.player.pos.y = policy.player.start_y - 200.0;
        update(&mut state, &policy, &[]);
        assert_eq!(state.score, 20);
        state.player.pos.y = policy.player.start_y - 50.0;
        update(&mut state, &policy, &[]);
        assert_eq!(state.score, 20);
    }

    #[test]
    fn test_avoided_counts_only_unhit_obstacles() {
        let policy = ModePolicy::preset(GameMode::Dodge);
        let mut state = GameState::new(&policy, 1);
        let clean = WorldObject {
            id: 1,
            pos: Vec2::new(0.0, 700.0),
            size: Vec2::splat(40.0),
            kind: ObjectKind::FallingObstacle { speed: 3.0 },
            consumed: false,
            touching: false,
        };
        let hit = WorldObject {
            id: 2,
            consumed: true,
            ..clean.clone()
        };
        let grazed = WorldObject {
            id: 3,
            touching: true,
            ..clean.clone()
        };
        update(&mut state, &policy, &[clean, hit, grazed]);
        assert_eq!(state.score, 1);
        assert_eq!(state.events, vec![GameEvent::ObstacleAvoided { id: 1 }]);
    }

    #[test]
    fn test_round_up_event() {
        let policy = ModePolicy::preset(GameMode::Flyer);
        let mut state = GameState::new(&policy, 1);
        state.score = policy.scoring.round_every;
        update(&mut state, &policy, &[]);
        assert_eq!(state.round, 2);
        assert!(state.events.contains(&GameEvent::RoundUp { round: 2 }));
        // No second event for the same round
        state.events.clear();
        update(&mut state, &policy, &[]);
        assert!(state.events.is_empty());
    }
}
