//! Common Types and Constants
//!
//! Shared data structures used across all engine modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

/// Milliseconds per day, used to turn timestamp deltas into fractional days
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Default recency decay per day for mastery estimation
pub const DEFAULT_DECAY_RATE: f64 = 0.05;

/// Mastery at or above this counts a topic as mastered
pub const DEFAULT_MASTERED_THRESHOLD: f64 = 0.9;

/// SM-2 ease factor floor
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// SM-2 starting ease factor
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Upper bound for a single review interval (ten years)
pub const MAX_INTERVAL_DAYS: u32 = 3650;

pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 5.0;
pub const DIFFICULTY_STEP: f64 = 0.5;

/// Default number of trailing attempts inspected by the trend classifier
pub const DEFAULT_TREND_WINDOW: usize = 5;

// ==================== Attempt Types ====================

/// One answered question, as supplied by the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// Whether the answer was correct
    pub is_correct: bool,
    /// When the answer was submitted
    pub timestamp: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn new(is_correct: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_correct,
            timestamp,
        }
    }

    /// Fractional days between this attempt and `now`. Negative when the
    /// attempt lies in the future of `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        (now - self.timestamp).num_milliseconds() as f64 / MS_PER_DAY
    }
}

/// Plain (unweighted) accuracy of a slice of attempts; 0 when empty
pub fn raw_accuracy(attempts: &[AttemptRecord]) -> f64 {
    if attempts.is_empty() {
        return 0.0;
    }
    let correct = attempts.iter().filter(|a| a.is_correct).count();
    correct as f64 / attempts.len() as f64
}

// ==================== Trend Types ====================

/// Label for a recent performance window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

impl Trend {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "improving" => Some(Trend::Improving),
            "declining" => Some(Trend::Declining),
            "stable" => Some(Trend::Stable),
            "insufficient_data" => Some(Trend::InsufficientData),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
            Trend::InsufficientData => "insufficient_data",
        }
    }

    pub fn has_data(&self) -> bool {
        !matches!(self, Trend::InsufficientData)
    }
}

// ==================== Difficulty Types ====================

/// Coarse band of a continuous difficulty level, used for content selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyBand {
    Easy,
    Mid,
    Hard,
}

impl DifficultyBand {
    pub fn from_level(level: f64) -> Self {
        if level < 2.5 {
            DifficultyBand::Easy
        } else if level < 4.0 {
            DifficultyBand::Mid
        } else {
            DifficultyBand::Hard
        }
    }

    pub fn to_index(&self) -> usize {
        match self {
            DifficultyBand::Easy => 0,
            DifficultyBand::Mid => 1,
            DifficultyBand::Hard => 2,
        }
    }
}
