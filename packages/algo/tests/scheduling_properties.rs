//! Property-Based Tests for the scheduling core
//!
//! Tests the following invariants:
//! - Priority grows with elapsed time and shrinks with level
//! - Memory strength stays in (0, 1] and falls as priority rises
//! - Failures never push a level below 1; outcomes move levels one way only
//! - Global level equals the weakest task after every attempt
//! - Known and new partitions stay disjoint under promotion

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use hanzi_srs_algo::memory::{priority_from_elapsed, strength_from_priority};
use hanzi_srs_algo::transition::next_level_from_elapsed;
use hanzi_srs_algo::{
    memory_strength, seeded_rng, select_due_batch, IntroductionDecision, Item, Outcome, Pool,
    ScriptedSource, TaskKind, TrainingParams, VocabRecord,
};

// ============================================================================
// Fixtures
// ============================================================================

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
}

fn record(id: &str) -> VocabRecord {
    VocabRecord {
        id: id.to_string(),
        hanzi: "学".to_string(),
        pinyin: "xue2".to_string(),
        translation: "to study".to_string(),
        context: None,
    }
}

fn pool_of(n: usize) -> Pool {
    let mut pool = Pool::new();
    for i in 0..n {
        pool.ingest(record(&format!("w{i:03}")), t0());
    }
    pool
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Correct),
        Just(Outcome::Hinted),
        Just(Outcome::Incorrect),
    ]
}

fn arb_elapsed() -> impl Strategy<Value = f64> {
    (0u32..=2_000_000u32).prop_map(|v| v as f64 / 10.0)
}

// ============================================================================
// Model Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_priority_increases_with_elapsed(level in 0u32..30, a in arb_elapsed(), b in arb_elapsed()) {
        prop_assume!(a < b);
        prop_assert!(priority_from_elapsed(level, a) < priority_from_elapsed(level, b));
    }

    #[test]
    fn prop_priority_decreases_with_level(level in 0u32..30, elapsed in arb_elapsed()) {
        prop_assume!(elapsed > 0.0);
        prop_assert!(priority_from_elapsed(level + 1, elapsed) < priority_from_elapsed(level, elapsed));
    }

    #[test]
    fn prop_strength_in_unit_interval(level in 0u32..40, minutes in 0i64..200_000) {
        let s = memory_strength(level, t0(), t0() + Duration::minutes(minutes)).unwrap();
        prop_assert!(s > 0.0 && s <= 1.0, "strength {} out of range", s);
    }

    #[test]
    fn prop_strength_decreasing_in_priority(p in 0.0f64..50.0, dp in 0.001f64..10.0) {
        prop_assert!(strength_from_priority(p + dp) < strength_from_priority(p));
        prop_assert!(strength_from_priority(p) > 0.0);
    }

    #[test]
    fn prop_outcome_direction(
        level in 0u32..25,
        elapsed in arb_elapsed(),
        outcome in arb_outcome(),
        seed in any::<u64>(),
    ) {
        let mut rng = seeded_rng(Some(seed));
        let new_level = next_level_from_elapsed(level, elapsed, outcome, &mut rng);
        match outcome {
            Outcome::Correct => prop_assert!(new_level >= level),
            Outcome::Hinted => prop_assert_eq!(new_level, level),
            Outcome::Incorrect => {
                prop_assert!(new_level <= level);
                if level >= 1 {
                    prop_assert!(new_level >= 1);
                }
            }
        }
    }

    #[test]
    fn prop_repeated_failures_floor_at_one(start in 1u32..25, rounds in 1usize..20, seed in any::<u64>()) {
        let mut rng = seeded_rng(Some(seed));
        let mut level = start;
        for _ in 0..rounds {
            level = next_level_from_elapsed(level, 0.5, Outcome::Incorrect, &mut rng);
            prop_assert!(level >= 1);
        }
    }

    #[test]
    fn prop_global_level_is_task_minimum(
        attempts in prop::collection::vec((0usize..6, arb_outcome(), 1i64..5_000), 1..40),
        seed in any::<u64>(),
    ) {
        let mut item = Item::new(record("w"), t0());
        let mut rng = seeded_rng(Some(seed));
        let mut now = t0();
        for (task_idx, outcome, minutes) in attempts {
            now += Duration::minutes(minutes);
            item.record_attempt(TaskKind::ALL[task_idx], outcome, now, &mut rng).unwrap();
            let min = item.tasks().iter().map(|(_, t)| t.level).min().unwrap();
            prop_assert_eq!(item.global_level(), min);
        }
    }

    #[test]
    fn prop_partitions_stay_disjoint(n in 0usize..30, promotions in 0usize..40, seed in any::<u64>()) {
        let mut pool = pool_of(n);
        let mut rng = seeded_rng(Some(seed));
        for _ in 0..promotions {
            let _ = pool.select_and_promote_random_unseen_item(&mut rng);
            let known: HashSet<_> = pool.known().keys().collect();
            prop_assert!(pool.unseen().keys().all(|id| !known.contains(id)));
            prop_assert_eq!(pool.known().len() + pool.unseen().len(), n);
        }
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_deterministic_success_chain() {
    // level 3 after 16 minutes: P = 2
    let elapsed = 16.0;
    let s = strength_from_priority(priority_from_elapsed(3, elapsed));
    let below = (1.0 - s) * 0.5;

    let mut rigged = ScriptedSource::new([below, 0.999]);
    let level = next_level_from_elapsed(3, elapsed, Outcome::Correct, &mut rigged);
    assert!(level > 3);

    let mut rigged = ScriptedSource::new([1.0 - s + 1e-9]);
    let level = next_level_from_elapsed(3, elapsed, Outcome::Correct, &mut rigged);
    assert_eq!(level, 3);
}

#[test]
fn scenario_batch_selection_bound() {
    let mut pool = pool_of(12);
    let mut rng = seeded_rng(Some(2024));
    while pool.select_and_promote_random_unseen_item(&mut rng).is_some() {}

    let batch = select_due_batch(&pool, t0() + Duration::hours(1), 5, &mut rng).unwrap();
    assert_eq!(batch.len(), 5);
    let distinct: HashSet<_> = batch.ids().iter().collect();
    assert_eq!(distinct.len(), 5);
    assert!(batch.ids().iter().all(|id| pool.known().contains_key(id)));
}

#[test]
fn scenario_new_item_bucket_gating() {
    let mut pool = pool_of(6);
    let mut rng = seeded_rng(Some(3));
    for _ in 0..5 {
        pool.select_and_promote_random_unseen_item(&mut rng).unwrap();
    }
    // one correct answer per known item keeps them below level 4
    let now = t0() + Duration::minutes(3);
    let ids: Vec<_> = pool.known().keys().cloned().collect();
    let mut rigged = ScriptedSource::default();
    for id in &ids {
        pool.known_mut(id)
            .unwrap()
            .record_attempt(TaskKind::ALL[0], Outcome::Correct, now, &mut rigged)
            .unwrap();
    }

    let params = TrainingParams {
        max_ephemeral_words: 5,
        ..TrainingParams::default()
    };
    let later = now + Duration::minutes(30);
    assert!(pool.due_count(later) >= 1);
    assert_eq!(pool.histogram().count(hanzi_srs_algo::Gradation::Ephemeral), 5);
    assert!(matches!(
        pool.should_introduce_new_item(&params, later),
        IntroductionDecision::DoNotIntroduce(_)
    ));
}
