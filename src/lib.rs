//! # danci-mastery - adaptive mastery & scheduling engine
//!
//! Pure-Rust learning algorithms behind the practice and leaderboard
//! features:
//!
//! - **Mastery** - recency-weighted mastery from a right/wrong history
//! - **SM-2 Scheduling** - review intervals and ease factors
//! - **Difficulty** - half-step difficulty adaptation with hysteresis
//! - **Confidence / Trend** - answer confidence and recent-window trend labels
//! - **Streaks / Ranking / Badges** - daily streaks, deterministic
//!   leaderboards and table-driven badge awards
//!
//! Every operation is a pure function over caller-owned state: nothing is
//! stored between calls and nothing touches I/O, so the engine can be called
//! from any number of threads at once. Persisting the returned state is the
//! caller's job.
//!
//! ## Module layout
//!
//! - [`weighting`] - exponential recency weighting primitive
//! - [`mastery`] - mastery estimation (single and per-topic batch)
//! - [`scheduler`] - SM-2 review scheduling
//! - [`difficulty`] - difficulty adaptation
//! - [`confidence`] - confidence scoring
//! - [`trend`] - trend classification
//! - [`streak`] - daily streak tracking
//! - [`ranking`] - leaderboard ranking and percentiles
//! - [`badge`] - badge table evaluation
//! - [`engine`] - configured facade over all of the above
//! - [`config`] / [`error`] / [`logging`] / [`sanitize`] / [`types`]
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use danci_mastery::{MasteryEngine, SchedulableItem, StreakState};
//!
//! let engine = MasteryEngine::default();
//! let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
//!
//! let item = SchedulableItem::new(today);
//! let next = engine.schedule_next_review(&item, 0.9, today).unwrap();
//! assert_eq!(next.interval_days, 1);
//!
//! let streak = engine.advance_streak(&StreakState::default(), today).unwrap();
//! assert_eq!(streak.current_streak, 1);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod badge;
pub mod confidence;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod logging;
pub mod mastery;
pub mod ranking;
pub mod sanitize;
pub mod scheduler;
pub mod streak;
pub mod trend;
pub mod types;
pub mod weighting;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use error::{EngineError, EngineResult};

pub use config::{
    ConfidenceParams, DifficultyParams, EngineConfig, MasteryParams, SchedulerParams, TrendParams,
};

pub use engine::{MasteryEngine, ReviewInput, ReviewOutcome};

pub use weighting::{weighted_recency_mean, WeightedSample};

pub use mastery::{count_mastered_topics, estimate_mastery, estimate_topic_masteries};

pub use scheduler::{schedule_next_review, ReviewGrade, SchedulableItem};

pub use difficulty::adapt_difficulty;

pub use confidence::score_confidence;

pub use trend::classify_trend;

pub use streak::{
    advance_streak, advance_streak_at, current_streak_as_of, streak_from_dates, StreakState,
};

pub use ranking::{percentile, rank, RankPosition, RankedEntry, Ranking, RankingCandidate};

pub use badge::{
    badge_progress, evaluate_badges, BadgeId, BadgeProgress, BadgeRule, BadgeStats, BADGE_RULES,
};
