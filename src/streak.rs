//! Streak Tracking
//!
//! Daily-completion streaks keyed on calendar days. The tracker owns no
//! storage: callers pass the persisted state and a day, and get the next
//! state back.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub max_streak: u32,
    pub last_completed_at: Option<NaiveDate>,
}

/// Record a completion on `today`.
///
/// Same-day repeats return the state unchanged; a completion the day after
/// the last one extends the streak; any longer gap restarts it at 1.
/// `today` earlier than `last_completed_at` is rejected.
pub fn advance_streak(state: &StreakState, today: NaiveDate) -> EngineResult<StreakState> {
    let Some(last) = state.last_completed_at else {
        return Ok(StreakState {
            current_streak: 1,
            max_streak: state.max_streak.max(1),
            last_completed_at: Some(today),
        });
    };

    let gap = (today - last).num_days();
    let current_streak = match gap {
        g if g < 0 => {
            return Err(EngineError::invalid(
                "now",
                format!("{today} is earlier than last completion {last}"),
            ))
        }
        0 => return Ok(*state),
        1 => state.current_streak.saturating_add(1),
        _ => 1,
    };

    Ok(StreakState {
        current_streak,
        max_streak: state.max_streak.max(current_streak),
        last_completed_at: Some(today),
    })
}

/// Same as [`advance_streak`], truncating `now` to the calendar day of its
/// own timezone.
pub fn advance_streak_at<Tz: TimeZone>(
    state: &StreakState,
    now: &DateTime<Tz>,
) -> EngineResult<StreakState> {
    advance_streak(state, now.date_naive())
}

/// Streak as it should be displayed on `today`: still alive if the last
/// completion was today or yesterday, otherwise 0.
pub fn current_streak_as_of(state: &StreakState, today: NaiveDate) -> u32 {
    match state.last_completed_at {
        Some(last) if (0..=1).contains(&(today - last).num_days()) => state.current_streak,
        _ => 0,
    }
}

/// Rebuild a streak from raw completion days. Duplicates and order don't
/// matter. The run must reach today or yesterday to count; days after
/// `today` are ignored.
pub fn streak_from_dates(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let Some(&latest) = days.first() else {
        return 0;
    };
    if (today - latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 1u32;
    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn state(current: u32, max: u32, last: Option<u32>) -> StreakState {
        StreakState {
            current_streak: current,
            max_streak: max,
            last_completed_at: last.map(day),
        }
    }

    #[test]
    fn test_first_completion() {
        let next = advance_streak(&StreakState::default(), day(10)).unwrap();
        assert_eq!(next, state(1, 1, Some(10)));
    }

    #[test]
    fn test_first_completion_keeps_higher_max() {
        let next = advance_streak(&state(0, 9, None), day(10)).unwrap();
        assert_eq!(next, state(1, 9, Some(10)));
    }

    #[test]
    fn test_consecutive_day_extends() {
        let next = advance_streak(&state(3, 5, Some(9)), day(10)).unwrap();
        assert_eq!(next, state(4, 5, Some(10)));
    }

    #[test]
    fn test_extension_lifts_max() {
        let next = advance_streak(&state(5, 5, Some(9)), day(10)).unwrap();
        assert_eq!(next, state(6, 6, Some(10)));
    }

    #[test]
    fn test_same_day_is_idempotent() {
        let s = state(4, 6, Some(10));
        let once = advance_streak(&s, day(10)).unwrap();
        let twice = advance_streak(&once, day(10)).unwrap();
        assert_eq!(once, s);
        assert_eq!(twice, s);
    }

    #[test]
    fn test_gap_resets_current_only() {
        let next = advance_streak(&state(7, 12, Some(7)), day(10)).unwrap();
        assert_eq!(next, state(1, 12, Some(10)));
    }

    #[test]
    fn test_two_day_gap_resets() {
        let next = advance_streak(&state(2, 2, Some(8)), day(10)).unwrap();
        assert_eq!(next.current_streak, 1);
    }

    #[test]
    fn test_rejects_time_going_backwards() {
        let err = advance_streak(&state(2, 2, Some(10)), day(9)).unwrap_err();
        assert_eq!(err.field(), Some("now"));
    }

    #[test]
    fn test_advance_at_uses_local_day() {
        // 23:30 on the 9th in UTC-5 is already the 10th in UTC
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = tz.with_ymd_and_hms(2024, 5, 9, 23, 30, 0).unwrap();
        let next = advance_streak_at(&state(1, 1, Some(8)), &local).unwrap();
        assert_eq!(next, state(2, 2, Some(9)));

        let utc = local.with_timezone(&Utc);
        let next = advance_streak_at(&state(1, 1, Some(8)), &utc).unwrap();
        assert_eq!(next, state(1, 1, Some(10)));
    }

    #[test]
    fn test_current_streak_as_of() {
        let s = state(4, 6, Some(10));
        assert_eq!(current_streak_as_of(&s, day(10)), 4);
        assert_eq!(current_streak_as_of(&s, day(11)), 4);
        assert_eq!(current_streak_as_of(&s, day(12)), 0);
        assert_eq!(current_streak_as_of(&StreakState::default(), day(12)), 0);
    }

    #[test]
    fn test_streak_from_dates() {
        let dates = vec![day(10), day(9), day(9), day(8), day(5), day(4)];
        assert_eq!(streak_from_dates(&dates, day(10)), 3);
        assert_eq!(streak_from_dates(&dates, day(11)), 3);
        assert_eq!(streak_from_dates(&dates, day(12)), 0);
        assert_eq!(streak_from_dates(&[], day(12)), 0);
    }

    #[test]
    fn test_streak_from_dates_ignores_future_and_order() {
        let dates = vec![day(4), day(6), day(5), day(20)];
        assert_eq!(streak_from_dates(&dates, day(6)), 3);
    }
}
