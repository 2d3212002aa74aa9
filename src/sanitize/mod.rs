//! Input Validation
//!
//! Numerical guards shared by every component.
//!
//! Functions:
//! - Finite / range checks that reject instead of clamping
//! - Output normalization (rounding, negative-zero removal)

use crate::error::{EngineError, EngineResult};
use crate::types::EPSILON;

pub fn ensure_finite(field: &'static str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::invalid(field, format!("must be finite, got {value}")))
    }
}

pub fn ensure_non_negative(field: &'static str, value: f64) -> EngineResult<f64> {
    let value = ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(EngineError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(value)
}

pub fn ensure_positive(field: &'static str, value: f64) -> EngineResult<f64> {
    let value = ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(EngineError::invalid(field, format!("must be > 0, got {value}")));
    }
    Ok(value)
}

/// Accepts values in [0, 1]
pub fn ensure_unit_interval(field: &'static str, value: f64) -> EngineResult<f64> {
    let value = ensure_finite(field, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(EngineError::invalid(
            field,
            format!("must be within [0, 1], got {value}"),
        ));
    }
    Ok(value)
}

/// Round to a fixed number of decimals, dropping negative zero
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    normalize_zero((value * factor).round() / factor)
}

/// Map -0.0 (and values within EPSILON of zero) to +0.0
pub fn normalize_zero(value: f64) -> f64 {
    if value.abs() < EPSILON {
        0.0
    } else {
        value
    }
}

/// Clamp into [0, 1]; NaN becomes 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    normalize_zero(value.clamp(0.0, 1.0))
}
