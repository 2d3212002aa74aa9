//! Spaced Repetition Scheduler
//!
//! SM-2 interval / ease-factor scheduling. Each graded review maps the current
//! item state to a new one; nothing is kept between calls.
//!
//! `performance` in [0, 1] stands in for the SM-2 0-5 grade (`q = 5·p`).

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerParams;
use crate::error::{EngineError, EngineResult};
use crate::sanitize::ensure_unit_interval;
use crate::types::{DEFAULT_EASE_FACTOR, EPSILON};

/// Review state of one learner x item pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulableItem {
    pub interval_days: u32,
    pub repetitions: u32,
    pub ease_factor: f64,
    pub due_date: NaiveDate,
    pub last_reviewed: Option<NaiveDate>,
}

impl SchedulableItem {
    /// Never-reviewed item, due immediately
    pub fn new(today: NaiveDate) -> Self {
        Self {
            interval_days: 0,
            repetitions: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            due_date: today,
            last_reviewed: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.last_reviewed.is_none()
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due_date <= today
    }

    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.due_date).num_days().max(0)
    }
}

/// Discrete review grade derived from correctness and answer confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewGrade {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewGrade {
    pub fn from_attempt(is_correct: bool, confidence: f64) -> Self {
        if !is_correct {
            return Self::Again;
        }
        if confidence < 0.4 {
            Self::Hard
        } else if confidence < 0.8 {
            Self::Good
        } else {
            Self::Easy
        }
    }

    /// Performance value fed into the scheduler. Every passing grade sits at
    /// or above the default recall threshold.
    pub fn performance(&self) -> f64 {
        match self {
            Self::Again => 0.0,
            Self::Hard => 0.6,
            Self::Good => 0.8,
            Self::Easy => 1.0,
        }
    }
}

/// SM-2 ease-factor update, floored at `min_ease`
pub fn next_ease_factor(ease_factor: f64, performance: f64, min_ease: f64) -> f64 {
    let distance = 5.0 - performance * 5.0;
    let delta = 0.1 - distance * (0.08 + distance * 0.02);
    (ease_factor + delta).max(min_ease)
}

pub fn schedule_next_review(
    item: &SchedulableItem,
    performance: f64,
    today: NaiveDate,
) -> EngineResult<SchedulableItem> {
    schedule_next_review_with(item, performance, today, &SchedulerParams::default())
}

/// Apply one graded review to `item`.
///
/// Successful recall (`performance >= recall_threshold`) steps the interval
/// 1 -> 6 -> interval x EF (always at least one day longer), capped at
/// `max_interval_days`. A failed recall
/// resets repetitions and interval but keeps the ease factor.
pub fn schedule_next_review_with(
    item: &SchedulableItem,
    performance: f64,
    today: NaiveDate,
    params: &SchedulerParams,
) -> EngineResult<SchedulableItem> {
    let performance = ensure_unit_interval("performance", performance)?;
    if !item.ease_factor.is_finite() || item.ease_factor < params.min_ease_factor - EPSILON {
        return Err(EngineError::invalid(
            "ease_factor",
            format!(
                "must be >= {}, got {}",
                params.min_ease_factor, item.ease_factor
            ),
        ));
    }
    if let Some(last) = item.last_reviewed {
        if today < last {
            return Err(EngineError::invalid(
                "today",
                format!("{today} is earlier than last review {last}"),
            ));
        }
    }

    let (interval_days, repetitions) = if performance >= params.recall_threshold {
        let interval = match item.repetitions {
            0 => params.first_interval_days,
            1 => grow_interval(item.interval_days, item.ease_factor, params)
                .max(params.second_interval_days),
            _ => grow_interval(item.interval_days, item.ease_factor, params),
        };
        (
            interval.clamp(params.first_interval_days, params.max_interval_days),
            item.repetitions.saturating_add(1),
        )
    } else {
        (params.first_interval_days, 0)
    };

    let ease_factor = next_ease_factor(item.ease_factor, performance, params.min_ease_factor);

    let due_date = today
        .checked_add_days(Days::new(u64::from(interval_days)))
        .ok_or_else(|| {
            EngineError::invalid("today", format!("{today} + {interval_days} days overflows"))
        })?;

    Ok(SchedulableItem {
        interval_days,
        repetitions,
        ease_factor,
        due_date,
        last_reviewed: Some(today),
    })
}

/// `interval x EF`, at least one day longer than before, capped
fn grow_interval(interval_days: u32, ease_factor: f64, params: &SchedulerParams) -> u32 {
    let current = f64::from(interval_days);
    let grown = (current * ease_factor).round().max(current + 1.0);
    let capped = grown.min(f64::from(params.max_interval_days));
    if capped < grown {
        tracing::trace!(grown, cap = params.max_interval_days, "review interval capped");
    }
    capped as u32
}
