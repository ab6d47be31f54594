use proptest::prelude::*;

use dmwda_retarget::{AdjustmentPath, DifficultyEngine, EngineState, RetargetParams};

/// Solve times spanning bursts, normal operation and stalls.
///
/// Bursts are kept rare: a fixed series never reacts to difficulty, so a long
/// unbroken burst would eventually overflow any 64-bit difficulty.
fn solve_times() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![
            1 => 1.0f64..48.0,
            8 => 48.0f64..4800.0,
            1 => 4800.0f64..100_000.0,
        ],
        1..250,
    )
}

proptest! {
    /// Two independent runs over the same inputs are bit-identical.
    #[test]
    fn replay_is_deterministic(times in solve_times(), initial in 10_000u64..10_000_000) {
        let params = RetargetParams::production();
        let (a, _) = DifficultyEngine::replay(params.clone(), initial, &times).unwrap();
        let (b, _) = DifficultyEngine::replay(params, initial, &times).unwrap();
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }

    /// Replaying the recorded time series reproduces the recorded difficulties.
    #[test]
    fn history_round_trips(times in solve_times()) {
        let params = RetargetParams::production();
        let (state, _) = DifficultyEngine::replay(params.clone(), 1_000_000, &times).unwrap();
        let history = state.history();
        let (replayed, _) =
            DifficultyEngine::replay(params, 1_000_000, &history.time_series[1..]).unwrap();
        prop_assert_eq!(replayed.history().difficulty_history, history.difficulty_history);
    }

    /// Lengths stay aligned and every value respects the floor.
    #[test]
    fn floor_and_alignment_hold(times in solve_times(), min_difficulty in 1u64..50_000) {
        let params = RetargetParams {
            min_difficulty,
            ..RetargetParams::production()
        };
        let (state, _) = DifficultyEngine::replay(params, 50_000, &times).unwrap();
        let history = state.history();
        prop_assert_eq!(history.time_series.len(), history.difficulty_history.len());
        prop_assert_eq!(history.time_series.len(), times.len() + 1);
        for &d in history.difficulty_history {
            prop_assert!(d >= min_difficulty, "difficulty {} below floor {}", d, min_difficulty);
        }
    }

    /// Every applied ratio stays inside the bounds of the path that chose it.
    #[test]
    fn ratios_respect_path_bounds(times in solve_times()) {
        let params = RetargetParams::production();
        let (_, outcomes) = DifficultyEngine::replay(params.clone(), 1_000_000, &times).unwrap();
        for outcome in outcomes {
            match outcome.path {
                AdjustmentPath::EarlyProtection => {
                    prop_assert!(outcome.index < params.early_protect_count);
                    prop_assert_eq!(outcome.difficulty, 1_000_000);
                }
                AdjustmentPath::Normal { ratio, confidence, .. } => {
                    prop_assert!(ratio >= params.min_adjustment && ratio <= params.max_adjustment);
                    prop_assert!((0.1..=1.0).contains(&confidence));
                }
                AdjustmentPath::Emergency { ratio, .. } => {
                    prop_assert!(
                        ratio >= params.emergency_threshold
                            && ratio <= params.emergency_ceiling()
                    );
                }
            }
        }
    }

    /// The pre-smoothing value is exactly `floor(previous * ratio)`, and the
    /// committed value lies between the previous and pre-smoothing values
    /// (or at the floor).
    #[test]
    fn smoothing_stays_between_old_and_new(times in solve_times()) {
        let params = RetargetParams::production();
        let (_, outcomes) = DifficultyEngine::replay(params.clone(), 1_000_000, &times).unwrap();
        for outcome in outcomes {
            let Some(ratio) = outcome.path.ratio() else { continue };
            prop_assert_eq!(outcome.unsmoothed, (outcome.previous as f64 * ratio) as u64);
            let lo = outcome.previous.min(outcome.unsmoothed);
            let hi = outcome.previous.max(outcome.unsmoothed);
            prop_assert!(
                (outcome.difficulty >= lo && outcome.difficulty <= hi)
                    || outcome.difficulty == params.min_difficulty
            );
        }
    }

    /// Early protection holds regardless of how extreme the first samples are.
    #[test]
    fn early_protection_holds(
        first in prop_oneof![Just(1.0f64), Just(1_000_000.0f64), 1.0f64..1_000_000.0],
        second in prop_oneof![Just(1.0f64), Just(1_000_000.0f64), 1.0f64..1_000_000.0],
        initial in 10_000u64..1_000_000_000,
    ) {
        let mut state = EngineState::create(RetargetParams::production(), initial).unwrap();
        state.step(first).unwrap();
        state.step(second).unwrap();
        prop_assert_eq!(state.history().difficulty_history, &[initial; 3][..]);
    }
}
