//! Engine Configuration
//!
//! Tunable parameters per component, with defaults, environment and JSON
//! overrides. Validation keeps every override inside the fixed bounds
//! (ease floor, difficulty range and grid).

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::{
    DEFAULT_DECAY_RATE, DEFAULT_EASE_FACTOR, DEFAULT_MASTERED_THRESHOLD, DEFAULT_TREND_WINDOW,
    DIFFICULTY_STEP, MAX_DIFFICULTY, MAX_INTERVAL_DAYS, MIN_DIFFICULTY, MIN_EASE_FACTOR,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MasteryParams {
    pub decay_rate: f64,
    pub mastered_threshold: f64,
}

impl Default for MasteryParams {
    fn default() -> Self {
        Self {
            decay_rate: DEFAULT_DECAY_RATE,
            mastered_threshold: DEFAULT_MASTERED_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerParams {
    /// Performance at or above this counts as a successful recall
    pub recall_threshold: f64,
    pub first_interval_days: u32,
    pub second_interval_days: u32,
    pub initial_ease_factor: f64,
    pub min_ease_factor: f64,
    pub max_interval_days: u32,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            recall_threshold: 0.6,
            first_interval_days: 1,
            second_interval_days: 6,
            initial_ease_factor: DEFAULT_EASE_FACTOR,
            min_ease_factor: MIN_EASE_FACTOR,
            max_interval_days: MAX_INTERVAL_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DifficultyParams {
    pub step: f64,
    pub min_level: f64,
    pub max_level: f64,
    pub raise_threshold: f64,
    pub lower_threshold: f64,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self {
            step: DIFFICULTY_STEP,
            min_level: MIN_DIFFICULTY,
            max_level: MAX_DIFFICULTY,
            raise_threshold: 0.8,
            lower_threshold: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfidenceParams {
    pub time_weight: f64,
    pub accuracy_weight: f64,
}

impl Default for ConfidenceParams {
    fn default() -> Self {
        Self {
            time_weight: 0.3,
            accuracy_weight: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrendParams {
    pub window_size: usize,
    pub improving_threshold: f64,
    pub declining_threshold: f64,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_TREND_WINDOW,
            improving_threshold: 0.7,
            declining_threshold: 0.4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub mastery: MasteryParams,
    pub scheduler: SchedulerParams,
    pub difficulty: DifficultyParams,
    pub confidence: ConfidenceParams,
    pub trend: TrendParams,
}

impl EngineConfig {
    /// Defaults overridden by `MASTERY_DECAY_RATE`, `MASTERY_THRESHOLD`,
    /// `SRS_MAX_INTERVAL_DAYS` and `TREND_WINDOW_SIZE`. Values that fail to
    /// parse keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(rate) = env_parse::<f64>("MASTERY_DECAY_RATE") {
            config.mastery.decay_rate = rate;
        }
        if let Some(threshold) = env_parse::<f64>("MASTERY_THRESHOLD") {
            config.mastery.mastered_threshold = threshold;
        }
        if let Some(max_interval) = env_parse::<u32>("SRS_MAX_INTERVAL_DAYS") {
            config.scheduler.max_interval_days = max_interval;
        }
        if let Some(window) = env_parse::<usize>("TREND_WINDOW_SIZE") {
            config.trend.window_size = window;
        }

        config
    }

    /// Decode a (possibly partial) JSON document and validate it
    pub fn from_json(raw: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let m = &self.mastery;
        if !(m.decay_rate.is_finite() && m.decay_rate > 0.0) {
            return Err(invalid(format!("mastery.decayRate must be > 0, got {}", m.decay_rate)));
        }
        check_unit("mastery.masteredThreshold", m.mastered_threshold)?;

        let s = &self.scheduler;
        check_unit("scheduler.recallThreshold", s.recall_threshold)?;
        if !(s.min_ease_factor.is_finite() && s.min_ease_factor >= MIN_EASE_FACTOR) {
            return Err(invalid(format!(
                "scheduler.minEaseFactor must be >= {MIN_EASE_FACTOR}, got {}",
                s.min_ease_factor
            )));
        }
        if !(s.initial_ease_factor.is_finite() && s.initial_ease_factor >= s.min_ease_factor) {
            return Err(invalid(format!(
                "scheduler.initialEaseFactor {} is below minEaseFactor {}",
                s.initial_ease_factor, s.min_ease_factor
            )));
        }
        if s.first_interval_days == 0 || s.second_interval_days < s.first_interval_days {
            return Err(invalid(format!(
                "scheduler intervals must satisfy 0 < first <= second, got {} and {}",
                s.first_interval_days, s.second_interval_days
            )));
        }
        if s.max_interval_days < s.second_interval_days {
            return Err(invalid(format!(
                "scheduler.maxIntervalDays {} is below secondIntervalDays {}",
                s.max_interval_days, s.second_interval_days
            )));
        }

        let d = &self.difficulty;
        if !(d.step.is_finite() && d.step > 0.0 && on_grid(d.step, DIFFICULTY_STEP)) {
            return Err(invalid(format!(
                "difficulty.step must be a positive multiple of {DIFFICULTY_STEP}, got {}",
                d.step
            )));
        }
        if !(d.min_level.is_finite() && d.max_level.is_finite() && d.min_level < d.max_level) {
            return Err(invalid(format!(
                "difficulty range [{}, {}] is empty",
                d.min_level, d.max_level
            )));
        }
        if d.min_level < MIN_DIFFICULTY || d.max_level > MAX_DIFFICULTY {
            return Err(invalid(format!(
                "difficulty range [{}, {}] exceeds [{MIN_DIFFICULTY}, {MAX_DIFFICULTY}]",
                d.min_level, d.max_level
            )));
        }
        if !on_grid(d.min_level - MIN_DIFFICULTY, DIFFICULTY_STEP)
            || !on_grid(d.max_level - d.min_level, d.step)
        {
            return Err(invalid(format!(
                "difficulty range [{}, {}] is not on the {} step grid",
                d.min_level, d.max_level, d.step
            )));
        }
        check_unit("difficulty.lowerThreshold", d.lower_threshold)?;
        check_unit("difficulty.raiseThreshold", d.raise_threshold)?;
        if d.lower_threshold >= d.raise_threshold {
            return Err(invalid(format!(
                "difficulty hysteresis band [{}, {}) is inverted",
                d.lower_threshold, d.raise_threshold
            )));
        }

        let c = &self.confidence;
        check_unit("confidence.timeWeight", c.time_weight)?;
        check_unit("confidence.accuracyWeight", c.accuracy_weight)?;
        if (c.time_weight + c.accuracy_weight - 1.0).abs() > 1e-6 {
            return Err(invalid(format!(
                "confidence weights must sum to 1, got {}",
                c.time_weight + c.accuracy_weight
            )));
        }

        let t = &self.trend;
        if t.window_size == 0 {
            return Err(invalid("trend.windowSize must be > 0".to_string()));
        }
        check_unit("trend.improvingThreshold", t.improving_threshold)?;
        check_unit("trend.decliningThreshold", t.declining_threshold)?;
        if t.declining_threshold > t.improving_threshold {
            return Err(invalid(format!(
                "trend thresholds inverted: declining {} > improving {}",
                t.declining_threshold, t.improving_threshold
            )));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}

/// `value` is a whole multiple of `unit`
fn on_grid(value: f64, unit: f64) -> bool {
    let steps = value / unit;
    (steps - steps.round()).abs() < 1e-6
}

fn check_unit(name: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be within [0, 1], got {value}")))
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::InvalidConfig(message)
}
