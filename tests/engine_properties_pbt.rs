//! Property-Based Tests for the mastery engine
//!
//! Tests the following invariants:
//! - Mastery stays in [0, 1]; empty history is exactly 0
//! - A fresh correct attempt never scores below a fresh incorrect one
//! - Perfect recall grows the interval strictly once repetitions >= 2
//! - Ease factor never drops below 1.3
//! - Difficulty stays in [1, 5] on the half-step grid
//! - Streaks are idempotent within a day and reset after a gap
//! - Ranking is deterministic and independent of input order
//! - Badge evaluation never re-emits a held badge

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use danci_mastery::{
    adapt_difficulty, advance_streak, estimate_mastery, evaluate_badges, rank,
    schedule_next_review, score_confidence, AttemptRecord, BadgeId, BadgeStats, RankingCandidate,
    SchedulableItem, StreakState,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn arb_f64_0_1() -> impl Strategy<Value = f64> {
    (0u64..=1000u64).prop_map(|v| v as f64 / 1000.0)
}

fn arb_attempt() -> impl Strategy<Value = AttemptRecord> {
    (any::<bool>(), 0i64..=365 * 24 * 60).prop_map(|(is_correct, minutes_ago)| {
        AttemptRecord::new(is_correct, now() - Duration::minutes(minutes_ago))
    })
}

fn arb_history() -> impl Strategy<Value = Vec<AttemptRecord>> {
    prop::collection::vec(arb_attempt(), 0..40)
}

fn arb_level() -> impl Strategy<Value = f64> {
    (0u32..=8u32).prop_map(|steps| 1.0 + steps as f64 * 0.5)
}

fn arb_candidates() -> impl Strategy<Value = Vec<RankingCandidate<i64>>> {
    prop::collection::vec((0u32..=20u32, 0i64..=5i64), 0..25).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (score, key))| RankingCandidate::new(format!("u{i}"), score as f64, key))
            .collect()
    })
}

fn arb_badge_stats() -> impl Strategy<Value = BadgeStats> {
    (0u32..=150, 0u32..=100, 0u32..=8, 0u32..=40).prop_map(
        |(completions, average_score, mastered_topics, streak_days)| BadgeStats {
            completions,
            average_score: average_score as f64,
            mastered_topics,
            streak_days,
        },
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_mastery_bounded(history in arb_history(), decay in 0.001f64..2.0) {
        let mastery = estimate_mastery(&history, now(), Some(decay)).unwrap();
        prop_assert!((0.0..=1.0).contains(&mastery));
        prop_assert!(!mastery.is_nan());
        if history.is_empty() {
            prop_assert_eq!(mastery, 0.0);
        }
    }

    #[test]
    fn prop_fresh_correct_beats_fresh_incorrect(history in arb_history()) {
        let mut with_correct = history.clone();
        with_correct.push(AttemptRecord::new(true, now()));
        let mut with_incorrect = history;
        with_incorrect.push(AttemptRecord::new(false, now()));

        let up = estimate_mastery(&with_correct, now(), None).unwrap();
        let down = estimate_mastery(&with_incorrect, now(), None).unwrap();
        prop_assert!(up >= down);
    }

    #[test]
    fn prop_confidence_bounded(
        spent in 0.0f64..1000.0,
        avg in 0.0f64..1000.0,
        accuracy in arb_f64_0_1(),
    ) {
        let c = score_confidence(spent, avg, accuracy).unwrap();
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn prop_ease_floor_holds(performances in prop::collection::vec(arb_f64_0_1(), 1..60)) {
        let mut item = SchedulableItem::new(base_day());
        for (i, p) in performances.into_iter().enumerate() {
            let today = base_day() + Duration::days(i as i64);
            item = schedule_next_review(&item, p, today).unwrap();
            prop_assert!(item.ease_factor >= 1.3);
            prop_assert!(item.interval_days >= 1);
            prop_assert!(item.interval_days <= 3650);
            prop_assert_eq!(item.due_date, today + Duration::days(item.interval_days as i64));
        }
    }

    #[test]
    fn prop_failure_always_resets(
        interval in 0u32..400,
        repetitions in 0u32..20,
        ease in 1.3f64..3.5,
        performance in 0.0f64..0.59,
    ) {
        let item = SchedulableItem {
            interval_days: interval,
            repetitions,
            ease_factor: ease,
            due_date: base_day(),
            last_reviewed: Some(base_day()),
        };
        let next = schedule_next_review(&item, performance, base_day()).unwrap();
        prop_assert_eq!(next.interval_days, 1);
        prop_assert_eq!(next.repetitions, 0);
    }

    #[test]
    fn prop_difficulty_clamped(level in arb_level(), performance in arb_f64_0_1()) {
        let next = adapt_difficulty(level, performance).unwrap();
        prop_assert!((1.0..=5.0).contains(&next));
        prop_assert!((next * 2.0 - (next * 2.0).round()).abs() < 1e-9);
        prop_assert!((next - level).abs() <= 0.5 + 1e-9);
    }

    #[test]
    fn prop_streak_same_day_idempotent(
        current in 0u32..100,
        extra in 0u32..100,
        last_offset in 0i64..30,
        gap in 0i64..5,
    ) {
        let last = base_day() + Duration::days(last_offset);
        let state = StreakState {
            current_streak: current,
            max_streak: current + extra,
            last_completed_at: Some(last),
        };
        let today = last + Duration::days(gap);
        let once = advance_streak(&state, today).unwrap();
        let twice = advance_streak(&once, today).unwrap();
        prop_assert_eq!(once, twice);
        prop_assert!(once.max_streak >= once.current_streak);
        prop_assert!(once.max_streak >= state.max_streak);
        if gap >= 2 {
            prop_assert_eq!(once.current_streak, 1);
            prop_assert_eq!(once.max_streak, state.max_streak.max(1));
        }
    }

    #[test]
    fn prop_ranking_deterministic(candidates in arb_candidates()) {
        let first = rank(&candidates, candidates.first().map(|c| c.id.as_str())).unwrap();
        let second = rank(&candidates, candidates.first().map(|c| c.id.as_str())).unwrap();
        prop_assert_eq!(&first, &second);

        let mut reversed = candidates.clone();
        reversed.reverse();
        let third = rank(&reversed, None).unwrap();
        prop_assert_eq!(&first.ordered, &third.ordered);

        for (i, entry) in first.ordered.iter().enumerate() {
            prop_assert_eq!(entry.rank, i + 1);
        }
        for pair in first.ordered.windows(2) {
            let (a, b) = (&pair[0].candidate, &pair[1].candidate);
            prop_assert!(a.score > b.score || (a.score == b.score && a.secondary_key <= b.secondary_key));
        }
        if let Some(position) = first.rank_of {
            prop_assert!(position.percentile <= 100);
            prop_assert_eq!(position.total, candidates.len());
        }
    }

    #[test]
    fn prop_badges_never_reemitted(
        stats in arb_badge_stats(),
        held_mask in prop::collection::vec(any::<bool>(), 8),
    ) {
        let held: HashSet<BadgeId> = danci_mastery::BADGE_RULES
            .iter()
            .zip(held_mask)
            .filter(|(_, keep)| *keep)
            .map(|(rule, _)| rule.id)
            .collect();
        let earned = evaluate_badges(&stats, &held).unwrap();
        for id in &earned {
            prop_assert!(!held.contains(id));
        }

        let all: HashSet<BadgeId> = held.iter().copied().chain(earned.iter().copied()).collect();
        prop_assert!(evaluate_badges(&stats, &all).unwrap().is_empty());
    }
}

#[test]
fn perfect_recall_interval_strictly_increases() {
    let mut item = SchedulableItem::new(base_day());
    let mut intervals = Vec::new();
    for i in 0..7 {
        let today = base_day() + Duration::days(i * 400);
        item = schedule_next_review(&item, 1.0, today).unwrap();
        intervals.push((item.repetitions, item.interval_days));
    }

    let grown: Vec<u32> = intervals
        .iter()
        .filter(|(reps, _)| *reps >= 2)
        .map(|(_, interval)| *interval)
        .collect();
    assert!(grown.len() >= 5);
    for pair in grown.windows(2) {
        assert!(pair[1] > pair[0], "intervals not increasing: {intervals:?}");
    }
}

proptest! {
    #[test]
    fn perfect_recall_grows_from_any_reviewed_state(
        interval in 1u32..=3650,
        repetitions in 2u32..50,
        ease in 1.3f64..3.5,
    ) {
        let mut item = SchedulableItem {
            interval_days: interval,
            repetitions,
            ease_factor: ease,
            due_date: base_day(),
            last_reviewed: Some(base_day()),
        };
        for _ in 0..4 {
            let previous = item.interval_days;
            let today = item.due_date;
            item = schedule_next_review(&item, 1.0, today).unwrap();
            prop_assert!(item.interval_days <= 3650);
            if previous < 3650 {
                prop_assert!(item.interval_days > previous, "{previous} -> {}", item.interval_days);
            } else {
                prop_assert_eq!(item.interval_days, 3650);
            }
        }
    }
}
