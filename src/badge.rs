//! Badge Evaluation
//!
//! Badge conditions live in one declarative table. Evaluation walks the table
//! uniformly, so adding a badge means adding a row.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::mastery::count_mastered_topics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeId {
    Decathlon,
    Marathon,
    Centurion,
    TopScorer,
    TripleMastery,
    PentaMastery,
    WeekStreak,
    MonthStreak,
}

impl BadgeId {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "decathlon" => Some(Self::Decathlon),
            "marathon" => Some(Self::Marathon),
            "centurion" => Some(Self::Centurion),
            "top-scorer" => Some(Self::TopScorer),
            "triple-mastery" => Some(Self::TripleMastery),
            "penta-mastery" => Some(Self::PentaMastery),
            "week-streak" => Some(Self::WeekStreak),
            "month-streak" => Some(Self::MonthStreak),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decathlon => "decathlon",
            Self::Marathon => "marathon",
            Self::Centurion => "centurion",
            Self::TopScorer => "top-scorer",
            Self::TripleMastery => "triple-mastery",
            Self::PentaMastery => "penta-mastery",
            Self::WeekStreak => "week-streak",
            Self::MonthStreak => "month-streak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeCategory {
    Learning,
    Accuracy,
    Mastery,
    Streak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeConditionType {
    Completions,
    AverageScore,
    MasteredTopics,
    Streak,
}

/// One row of the badge table: earned once `condition` reaches `threshold`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRule {
    pub id: BadgeId,
    pub category: BadgeCategory,
    pub condition: BadgeConditionType,
    pub threshold: f64,
}

const fn rule(
    id: BadgeId,
    category: BadgeCategory,
    condition: BadgeConditionType,
    threshold: f64,
) -> BadgeRule {
    BadgeRule {
        id,
        category,
        condition,
        threshold,
    }
}

pub const BADGE_RULES: &[BadgeRule] = &[
    rule(BadgeId::Decathlon, BadgeCategory::Learning, BadgeConditionType::Completions, 10.0),
    rule(BadgeId::Marathon, BadgeCategory::Learning, BadgeConditionType::Completions, 50.0),
    rule(BadgeId::Centurion, BadgeCategory::Learning, BadgeConditionType::Completions, 100.0),
    rule(BadgeId::TopScorer, BadgeCategory::Accuracy, BadgeConditionType::AverageScore, 90.0),
    rule(BadgeId::TripleMastery, BadgeCategory::Mastery, BadgeConditionType::MasteredTopics, 3.0),
    rule(BadgeId::PentaMastery, BadgeCategory::Mastery, BadgeConditionType::MasteredTopics, 5.0),
    rule(BadgeId::WeekStreak, BadgeCategory::Streak, BadgeConditionType::Streak, 7.0),
    rule(BadgeId::MonthStreak, BadgeCategory::Streak, BadgeConditionType::Streak, 30.0),
];

/// Aggregate learner statistics the badge table is evaluated against
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStats {
    pub completions: u32,
    /// Average score on a 0-100 scale
    pub average_score: f64,
    /// Topics whose mastery reached the mastered threshold
    pub mastered_topics: u32,
    pub streak_days: u32,
}

impl BadgeStats {
    pub fn from_topic_masteries(
        completions: u32,
        average_score: f64,
        topic_masteries: &[f64],
        mastered_threshold: f64,
        streak_days: u32,
    ) -> Self {
        Self {
            completions,
            average_score,
            mastered_topics: count_mastered_topics(topic_masteries, mastered_threshold),
            streak_days,
        }
    }

    pub fn value_for(&self, condition: BadgeConditionType) -> f64 {
        match condition {
            BadgeConditionType::Completions => f64::from(self.completions),
            BadgeConditionType::AverageScore => self.average_score,
            BadgeConditionType::MasteredTopics => f64::from(self.mastered_topics),
            BadgeConditionType::Streak => f64::from(self.streak_days),
        }
    }

    fn validate(&self) -> EngineResult<()> {
        if !self.average_score.is_finite() || !(0.0..=100.0).contains(&self.average_score) {
            return Err(EngineError::invalid(
                "average_score",
                format!("must be within [0, 100], got {}", self.average_score),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    pub badge_id: BadgeId,
    pub current_value: f64,
    pub target_value: f64,
    pub percentage: f64,
}

pub fn evaluate_badges(stats: &BadgeStats, held: &HashSet<BadgeId>) -> EngineResult<Vec<BadgeId>> {
    evaluate_badges_with(BADGE_RULES, stats, held)
}

/// Badges whose condition is met and which are not already held, in table
/// order.
pub fn evaluate_badges_with(
    rules: &[BadgeRule],
    stats: &BadgeStats,
    held: &HashSet<BadgeId>,
) -> EngineResult<Vec<BadgeId>> {
    stats.validate()?;

    let mut earned = Vec::new();
    for rule in rules {
        if held.contains(&rule.id) || earned.contains(&rule.id) {
            continue;
        }
        if stats.value_for(rule.condition) >= rule.threshold {
            earned.push(rule.id);
        }
    }
    Ok(earned)
}

/// Progress toward every badge in the table, capped at 100%
pub fn badge_progress(stats: &BadgeStats) -> Vec<BadgeProgress> {
    BADGE_RULES
        .iter()
        .map(|rule| {
            let current_value = stats.value_for(rule.condition);
            let percentage = if rule.threshold <= 0.0 {
                100.0
            } else {
                (current_value / rule.threshold * 100.0).clamp(0.0, 100.0)
            };
            BadgeProgress {
                badge_id: rule.id,
                current_value,
                target_value: rule.threshold,
                percentage,
            }
        })
        .collect()
}
