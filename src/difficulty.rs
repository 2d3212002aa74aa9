//! Difficulty Adaptation
//!
//! Moves a continuous difficulty level one half-step at a time. Performance
//! inside the hysteresis band [lower, raise) leaves the level unchanged.

use crate::config::DifficultyParams;
use crate::error::{EngineError, EngineResult};
use crate::sanitize::{ensure_finite, ensure_unit_interval, round_to};
use crate::types::{DifficultyBand, EPSILON};

pub fn adapt_difficulty(level: f64, performance: f64) -> EngineResult<f64> {
    adapt_difficulty_with(level, performance, &DifficultyParams::default())
}

pub fn adapt_difficulty_with(
    level: f64,
    performance: f64,
    params: &DifficultyParams,
) -> EngineResult<f64> {
    let level = validate_level(level, params)?;
    let performance = ensure_unit_interval("performance", performance)?;

    let next = if performance >= params.raise_threshold {
        level + params.step
    } else if performance < params.lower_threshold {
        level - params.step
    } else {
        level
    };

    Ok(round_to(next.clamp(params.min_level, params.max_level), 1))
}

/// Accept only levels inside the range and on the step grid
pub fn validate_level(level: f64, params: &DifficultyParams) -> EngineResult<f64> {
    let level = ensure_finite("level", level)?;
    if level < params.min_level - EPSILON || level > params.max_level + EPSILON {
        return Err(EngineError::invalid(
            "level",
            format!(
                "must be within [{}, {}], got {level}",
                params.min_level, params.max_level
            ),
        ));
    }
    let steps = (level - params.min_level) / params.step;
    if (steps - steps.round()).abs() > 1e-6 {
        return Err(EngineError::invalid(
            "level",
            format!("must be a multiple of {} from {}, got {level}", params.step, params.min_level),
        ));
    }
    Ok(level)
}

pub fn difficulty_band(level: f64) -> DifficultyBand {
    DifficultyBand::from_level(level)
}
