//! Property tests over random input sequences

use std::collections::HashSet;

use proptest::prelude::*;

use aqua_arcade::sim::generate;
use aqua_arcade::sim::physics::HorizontalInput;
use aqua_arcade::sim::tick::{start_run, tick, toggle_pause};
use aqua_arcade::sim::{GameEvent, GameMode, GamePhase, GameState, ModePolicy, Snapshot, TickInput};
use aqua_arcade::{Engine, MemoryBestScoreStore, NullSubmitter};

fn mode_strategy() -> impl Strategy<Value = GameMode> {
    prop_oneof![
        Just(GameMode::Jumper),
        Just(GameMode::Dodge),
        Just(GameMode::Flyer),
    ]
}

fn input_strategy() -> impl Strategy<Value = TickInput> {
    (0u8..3, prop::bool::weighted(0.15)).prop_map(|(dir, jump)| TickInput {
        horizontal: match dir {
            0 => HorizontalInput::None,
            1 => HorizontalInput::Left,
            _ => HorizontalInput::Right,
        },
        jump,
    })
}

fn inputs_strategy() -> impl Strategy<Value = Vec<TickInput>> {
    prop::collection::vec(input_strategy(), 1..400)
}

fn playing(mode: GameMode, seed: u64) -> (GameState, ModePolicy) {
    let policy = ModePolicy::preset(mode);
    let mut state = GameState::new(&policy, seed);
    assert!(start_run(&mut state, &policy, seed));
    (state, policy)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn ids_are_unique_and_increasing(mode in mode_strategy(), seed in any::<u64>(), inputs in inputs_strategy()) {
        let (mut state, policy) = playing(mode, seed);
        let mut max_seen = state.objects.iter().map(|o| o.id).max().unwrap_or(0);
        let mut seen: HashSet<u32> = state.objects.iter().map(|o| o.id).collect();

        for input in &inputs {
            tick(&mut state, &policy, input);
            prop_assert!(state.objects.windows(2).all(|w| w[0].id < w[1].id));
            for obj in &state.objects {
                if seen.insert(obj.id) {
                    prop_assert!(obj.id > max_seen, "id {} reused or out of order", obj.id);
                    max_seen = obj.id;
                }
            }
            if state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    #[test]
    fn lookahead_always_covered(mode in mode_strategy(), seed in any::<u64>(), inputs in inputs_strategy()) {
        let (mut state, policy) = playing(mode, seed);
        prop_assert!(generate::lookahead_satisfied(&state, &policy));
        for input in &inputs {
            tick(&mut state, &policy, input);
            prop_assert!(
                generate::lookahead_satisfied(&state, &policy),
                "reach {} at tick {}",
                generate::lookahead_reach(&state, &policy),
                state.time_ticks
            );
            if state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    #[test]
    fn lives_never_increase_and_drop_one_at_a_time(seed in any::<u64>(), inputs in inputs_strategy()) {
        let (mut state, policy) = playing(GameMode::Dodge, seed);
        let mut lives = state.player.lives.unwrap_or(0);
        for input in &inputs {
            tick(&mut state, &policy, input);
            let now = state.player.lives.unwrap_or(0);
            prop_assert!(now <= lives);
            prop_assert!(lives - now <= 1);
            if now == 0 {
                prop_assert_eq!(state.phase, GamePhase::GameOver);
            }
            lives = now;
            if state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    #[test]
    fn objects_score_at_most_once(mode in prop_oneof![Just(GameMode::Dodge), Just(GameMode::Flyer)], seed in any::<u64>(), inputs in inputs_strategy()) {
        let (mut state, policy) = playing(mode, seed);
        let mut scored = HashSet::new();
        for input in &inputs {
            tick(&mut state, &policy, input);
            for event in &state.events {
                if let GameEvent::ObstacleAvoided { id } | GameEvent::GapPassed { id } = event {
                    prop_assert!(scored.insert(*id), "object {} scored twice", id);
                }
            }
            prop_assert_eq!(state.score, scored.len() as u64);
            if state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    #[test]
    fn pause_freezes_the_world(mode in mode_strategy(), seed in any::<u64>(), inputs in inputs_strategy(), paused_ticks in 1usize..120) {
        let (mut state, policy) = playing(mode, seed);
        for input in inputs.iter().take(30) {
            tick(&mut state, &policy, input);
        }
        prop_assume!(state.phase == GamePhase::Playing);

        prop_assert!(toggle_pause(&mut state));
        let frozen = Snapshot::capture(&state, 0);
        for input in inputs.iter().cycle().take(paused_ticks) {
            prop_assert_eq!(tick(&mut state, &policy, input), None);
        }
        prop_assert_eq!(Snapshot::capture(&state, 0), frozen);
    }

    #[test]
    fn best_score_is_max_of_final_scores(initial in 0u64..50, finals in prop::collection::vec(0u64..100, 1..8)) {
        let mut engine = Engine::new(
            ModePolicy::preset(GameMode::Dodge),
            9,
            Box::new(NullSubmitter),
            Box::new(MemoryBestScoreStore::new(initial)),
        )
        .unwrap();

        let mut best = initial;
        for score in finals {
            prop_assert!(engine.start().is_some());
            engine.state_mut().score = score;
            engine.toggle_pause();
            prop_assert!(engine.quit());
            prop_assert!(engine.best_score() >= best);
            best = best.max(score);
            prop_assert_eq!(engine.best_score(), best);
            prop_assert!(engine.reset());
        }
    }
}
