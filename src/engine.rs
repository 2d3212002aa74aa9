//! Engine facade
//!
//! Binds every component to one [`EngineConfig`] and logs results. The engine
//! holds configuration only, so a single instance can be shared across
//! threads and called concurrently.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::badge::{self, BadgeId, BadgeProgress, BadgeStats};
use crate::confidence;
use crate::config::{EngineConfig, TrendParams};
use crate::difficulty;
use crate::error::{EngineError, EngineResult};
use crate::mastery;
use crate::ranking::{self, Ranking, RankingCandidate};
use crate::scheduler::{self, ReviewGrade, SchedulableItem};
use crate::streak::{self, StreakState};
use crate::trend;
use crate::types::{AttemptRecord, Trend};

/// Everything needed to grade one answered item
#[derive(Debug, Clone)]
pub struct ReviewInput<'a> {
    /// Attempt history for this learner x item, including the attempt being graded
    pub history: &'a [AttemptRecord],
    pub item: &'a SchedulableItem,
    pub difficulty: f64,
    pub time_spent: f64,
    pub avg_time: f64,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub mastery: f64,
    pub confidence: f64,
    pub trend: Trend,
    pub grade: ReviewGrade,
    pub difficulty: f64,
    pub item: SchedulableItem,
}

#[derive(Debug, Clone, Default)]
pub struct MasteryEngine {
    config: EngineConfig,
}

impl MasteryEngine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn from_env() -> EngineResult<Self> {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn estimate_mastery(
        &self,
        attempts: &[AttemptRecord],
        now: DateTime<Utc>,
        decay_rate: Option<f64>,
    ) -> EngineResult<f64> {
        let rate = decay_rate.unwrap_or(self.config.mastery.decay_rate);
        let mastery = logged(
            "estimate_mastery",
            mastery::estimate_mastery(attempts, now, Some(rate)),
        )?;
        debug!(attempts = attempts.len(), decay_rate = rate, mastery, "mastery estimated");
        Ok(mastery)
    }

    #[tracing::instrument(skip_all, fields(topics = topics.len()))]
    pub fn estimate_topic_masteries(
        &self,
        topics: &HashMap<String, Vec<AttemptRecord>>,
        now: DateTime<Utc>,
    ) -> EngineResult<BTreeMap<String, f64>> {
        let masteries = logged(
            "estimate_topic_masteries",
            mastery::estimate_topic_masteries(topics, now, Some(self.config.mastery.decay_rate)),
        )?;
        debug!(
            mastered = mastery::count_mastered_topics(
                masteries.values(),
                self.config.mastery.mastered_threshold
            ),
            "topic masteries estimated"
        );
        Ok(masteries)
    }

    /// Fresh item due `today`, starting at the configured ease factor
    pub fn new_item(&self, today: NaiveDate) -> SchedulableItem {
        SchedulableItem {
            ease_factor: self.config.scheduler.initial_ease_factor,
            ..SchedulableItem::new(today)
        }
    }

    pub fn schedule_next_review(
        &self,
        item: &SchedulableItem,
        performance: f64,
        today: NaiveDate,
    ) -> EngineResult<SchedulableItem> {
        let next = logged(
            "schedule_next_review",
            scheduler::schedule_next_review_with(item, performance, today, &self.config.scheduler),
        )?;
        debug!(
            performance,
            interval_days = next.interval_days,
            repetitions = next.repetitions,
            ease_factor = next.ease_factor,
            due_date = %next.due_date,
            "review scheduled"
        );
        Ok(next)
    }

    pub fn adapt_difficulty(&self, level: f64, performance: f64) -> EngineResult<f64> {
        let next = logged(
            "adapt_difficulty",
            difficulty::adapt_difficulty_with(level, performance, &self.config.difficulty),
        )?;
        debug!(level, performance, next, "difficulty adapted");
        Ok(next)
    }

    pub fn score_confidence(
        &self,
        time_spent: f64,
        avg_time: f64,
        accuracy: f64,
    ) -> EngineResult<f64> {
        let score = logged(
            "score_confidence",
            confidence::score_confidence_with(time_spent, avg_time, accuracy, &self.config.confidence),
        )?;
        debug!(time_spent, avg_time, accuracy, score, "confidence scored");
        Ok(score)
    }

    pub fn classify_trend(
        &self,
        attempts: &[AttemptRecord],
        window_size: Option<usize>,
    ) -> EngineResult<Trend> {
        let params = TrendParams {
            window_size: window_size.unwrap_or(self.config.trend.window_size),
            ..self.config.trend.clone()
        };
        let label = logged("classify_trend", trend::classify_trend_with(attempts, &params))?;
        debug!(attempts = attempts.len(), window = params.window_size, trend = label.as_str(), "trend classified");
        Ok(label)
    }

    pub fn advance_streak(&self, state: &StreakState, today: NaiveDate) -> EngineResult<StreakState> {
        let next = logged("advance_streak", streak::advance_streak(state, today))?;
        debug!(
            current = next.current_streak,
            max = next.max_streak,
            %today,
            "streak advanced"
        );
        Ok(next)
    }

    pub fn advance_streak_at<Tz: TimeZone>(
        &self,
        state: &StreakState,
        now: &DateTime<Tz>,
    ) -> EngineResult<StreakState> {
        self.advance_streak(state, now.date_naive())
    }

    pub fn rank<K: Ord + Clone>(
        &self,
        candidates: &[RankingCandidate<K>],
        target_id: Option<&str>,
    ) -> EngineResult<Ranking<K>> {
        let ranking = logged("rank", ranking::rank(candidates, target_id))?;
        if let Some(position) = ranking.rank_of {
            debug!(
                total = position.total,
                rank = position.rank,
                percentile = position.percentile,
                "target ranked"
            );
        }
        Ok(ranking)
    }

    pub fn evaluate_badges(
        &self,
        stats: &BadgeStats,
        held: &HashSet<BadgeId>,
    ) -> EngineResult<Vec<BadgeId>> {
        let earned = logged("evaluate_badges", badge::evaluate_badges(stats, held))?;
        if !earned.is_empty() {
            debug!(
                earned = ?earned.iter().map(BadgeId::as_str).collect::<Vec<_>>(),
                "badges earned"
            );
        }
        Ok(earned)
    }

    pub fn badge_progress(&self, stats: &BadgeStats) -> Vec<BadgeProgress> {
        badge::badge_progress(stats)
    }

    /// Grade one answered item: mastery from the history, confidence from
    /// time-on-task and mastery, trend, adapted difficulty, and the next
    /// review scheduled from the grade of the latest attempt.
    pub fn review_attempt(&self, input: &ReviewInput<'_>) -> EngineResult<ReviewOutcome> {
        let latest = input
            .history
            .iter()
            .max_by_key(|a| a.timestamp)
            .ok_or_else(|| {
                EngineError::invalid("history", "must contain the attempt being graded")
            })?;

        let mastery = self.estimate_mastery(input.history, input.now, None)?;
        let confidence = self.score_confidence(input.time_spent, input.avg_time, mastery)?;
        let trend = self.classify_trend(input.history, None)?;
        let difficulty = self.adapt_difficulty(input.difficulty, mastery)?;
        let grade = ReviewGrade::from_attempt(latest.is_correct, confidence);
        let item = self.schedule_next_review(input.item, grade.performance(), input.now.date_naive())?;

        Ok(ReviewOutcome {
            mastery,
            confidence,
            trend,
            grade,
            difficulty,
            item,
        })
    }
}

fn logged<T>(operation: &'static str, result: EngineResult<T>) -> EngineResult<T> {
    if let Err(err) = &result {
        warn!(operation, error = %err, "engine input rejected");
    }
    result
}
