//! Temporal Weighting
//!
//! Exponential recency weighting shared by mastery and confidence estimates.
//! A sample observed `days_ago` days back carries weight `e^(-λ·days_ago)`.

use crate::error::{EngineError, EngineResult};
use crate::sanitize::{clamp_unit, ensure_positive};

/// One weighted observation: correctness and its age in days
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSample {
    pub correct: bool,
    pub days_ago: f64,
}

impl WeightedSample {
    pub fn new(correct: bool, days_ago: f64) -> Self {
        Self { correct, days_ago }
    }
}

pub fn recency_weight(days_ago: f64, decay_rate: f64) -> f64 {
    (-decay_rate * days_ago).exp()
}

/// Weight-normalized mean of `correct` under exponential recency decay.
///
/// Returns 0 for an empty slice. Rejects `decay_rate <= 0` and samples whose
/// age is negative or non-finite.
pub fn weighted_recency_mean(samples: &[WeightedSample], decay_rate: f64) -> EngineResult<f64> {
    let decay_rate = ensure_positive("decay_rate", decay_rate)?;

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for sample in samples {
        if !sample.days_ago.is_finite() || sample.days_ago < 0.0 {
            return Err(EngineError::invalid(
                "days_ago",
                format!("must be a finite value >= 0, got {}", sample.days_ago),
            ));
        }
        let w = recency_weight(sample.days_ago, decay_rate);
        weight_total += w;
        if sample.correct {
            weighted_sum += w;
        }
    }

    // Very old samples can underflow every weight to zero
    if weight_total <= 0.0 {
        return Ok(0.0);
    }

    Ok(clamp_unit(weighted_sum / weight_total))
}
