//! Trend Classification
//!
//! Labels the most recent window of attempts by its accuracy.

use crate::config::TrendParams;
use crate::error::{EngineError, EngineResult};
use crate::types::{raw_accuracy, AttemptRecord, Trend, DEFAULT_TREND_WINDOW};

pub fn classify_trend(attempts: &[AttemptRecord], window_size: Option<usize>) -> EngineResult<Trend> {
    let params = TrendParams {
        window_size: window_size.unwrap_or(DEFAULT_TREND_WINDOW),
        ..TrendParams::default()
    };
    classify_trend_with(attempts, &params)
}

/// Attempts are ordered by timestamp before the trailing window is taken;
/// equal timestamps keep their input order.
pub fn classify_trend_with(attempts: &[AttemptRecord], params: &TrendParams) -> EngineResult<Trend> {
    let window = params.window_size;
    if window == 0 {
        return Err(EngineError::invalid("window_size", "must be > 0"));
    }
    if attempts.len() < window {
        return Ok(Trend::InsufficientData);
    }

    let mut ordered = attempts.to_vec();
    ordered.sort_by_key(|a| a.timestamp);
    let accuracy = raw_accuracy(&ordered[ordered.len() - window..]);

    Ok(if accuracy > params.improving_threshold {
        Trend::Improving
    } else if accuracy < params.declining_threshold {
        Trend::Declining
    } else {
        Trend::Stable
    })
}
