//! Confidence Scoring
//!
//! Blends time-on-task with the learner's track record. Time is a weak
//! signal (rushing and dwelling both suggest uncertainty), so it only gets the
//! minority weight.

use crate::config::ConfidenceParams;
use crate::error::EngineResult;
use crate::sanitize::{clamp_unit, ensure_non_negative, ensure_unit_interval};

/// `1 - |spent - avg| / max(avg, 1)`, clamped to [0, 1]
pub fn time_factor(time_spent: f64, avg_time: f64) -> f64 {
    let reference = avg_time.max(1.0);
    clamp_unit(1.0 - (time_spent - avg_time).abs() / reference)
}

pub fn score_confidence(time_spent: f64, avg_time: f64, accuracy: f64) -> EngineResult<f64> {
    score_confidence_with(time_spent, avg_time, accuracy, &ConfidenceParams::default())
}

pub fn score_confidence_with(
    time_spent: f64,
    avg_time: f64,
    accuracy: f64,
    params: &ConfidenceParams,
) -> EngineResult<f64> {
    let time_spent = ensure_non_negative("time_spent", time_spent)?;
    let avg_time = ensure_non_negative("avg_time", avg_time)?;
    let accuracy = ensure_unit_interval("accuracy", accuracy)?;

    let tf = time_factor(time_spent, avg_time);
    Ok(clamp_unit(
        params.time_weight * tf + params.accuracy_weight * accuracy,
    ))
}
