//! Mastery Estimation
//!
//! Turns a right/wrong attempt history into a 0-1 mastery score. Older
//! evidence is down-weighted exponentially rather than cut off, so the score
//! moves smoothly as attempts age.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::error::{EngineError, EngineResult};
use crate::types::{AttemptRecord, DEFAULT_DECAY_RATE};
use crate::weighting::{weighted_recency_mean, WeightedSample};

/// Recency-weighted mastery of one attempt history, evaluated at `now`.
///
/// Empty history yields exactly 0 ("never attempted"). Attempts stamped after
/// `now` are rejected.
pub fn estimate_mastery(
    attempts: &[AttemptRecord],
    now: DateTime<Utc>,
    decay_rate: Option<f64>,
) -> EngineResult<f64> {
    let decay_rate = decay_rate.unwrap_or(DEFAULT_DECAY_RATE);

    let samples = attempts
        .iter()
        .map(|attempt| {
            let days_ago = attempt.age_days(now);
            if days_ago < 0.0 {
                return Err(EngineError::invalid(
                    "attempts",
                    format!(
                        "attempt at {} is later than now ({})",
                        attempt.timestamp.to_rfc3339(),
                        now.to_rfc3339()
                    ),
                ));
            }
            Ok(WeightedSample::new(attempt.is_correct, days_ago))
        })
        .collect::<EngineResult<Vec<_>>>()?;

    weighted_recency_mean(&samples, decay_rate)
}

/// Mastery for many topics at once. Topics are independent, so they are
/// evaluated in parallel; the first invalid history aborts the batch.
pub fn estimate_topic_masteries(
    topics: &HashMap<String, Vec<AttemptRecord>>,
    now: DateTime<Utc>,
    decay_rate: Option<f64>,
) -> EngineResult<BTreeMap<String, f64>> {
    topics
        .par_iter()
        .map(|(topic, attempts)| {
            estimate_mastery(attempts, now, decay_rate).map(|mastery| (topic.clone(), mastery))
        })
        .collect()
}

/// Number of topics whose mastery reaches `threshold`
pub fn count_mastered_topics<'a, I>(masteries: I, threshold: f64) -> u32
where
    I: IntoIterator<Item = &'a f64>,
{
    masteries
        .into_iter()
        .filter(|&&mastery| mastery >= threshold)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn attempt(correct: bool, days_ago: i64) -> AttemptRecord {
        AttemptRecord::new(correct, now() - Duration::days(days_ago))
    }

    #[test]
    fn test_empty_history_is_zero() {
        assert_eq!(estimate_mastery(&[], now(), None), Ok(0.0));
    }

    #[test]
    fn test_all_correct_history_is_full_mastery() {
        let history = vec![attempt(true, 0), attempt(true, 5), attempt(true, 40)];
        let mastery = estimate_mastery(&history, now(), None).unwrap();
        assert!((mastery - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = vec![attempt(true, 1), attempt(false, 10), attempt(true, 3)];
        let b = vec![attempt(true, 3), attempt(true, 1), attempt(false, 10)];
        let ma = estimate_mastery(&a, now(), None).unwrap();
        let mb = estimate_mastery(&b, now(), None).unwrap();
        assert!((ma - mb).abs() < 1e-12);
    }

    #[test]
    fn test_recent_failure_weighs_more_than_old_success() {
        let history = vec![attempt(true, 60), attempt(false, 0)];
        let mastery = estimate_mastery(&history, now(), None).unwrap();
        assert!(mastery < 0.1);
    }

    #[test]
    fn test_custom_decay_rate() {
        let history = vec![attempt(true, 10), attempt(false, 0)];
        let slow = estimate_mastery(&history, now(), Some(0.01)).unwrap();
        let fast = estimate_mastery(&history, now(), Some(0.5)).unwrap();
        assert!(slow > fast);
    }

    #[test]
    fn test_rejects_future_attempt() {
        let history = vec![AttemptRecord::new(true, now() + Duration::minutes(5))];
        let err = estimate_mastery(&history, now(), None).unwrap_err();
        assert_eq!(err.field(), Some("attempts"));
    }

    #[test]
    fn test_rejects_bad_decay_rate() {
        let history = vec![attempt(true, 1)];
        assert!(estimate_mastery(&history, now(), Some(0.0)).is_err());
    }

    #[test]
    fn test_topic_batch_matches_single() {
        let mut topics = HashMap::new();
        topics.insert("algebra".to_string(), vec![attempt(true, 1), attempt(false, 2)]);
        topics.insert("geometry".to_string(), vec![attempt(true, 0)]);
        topics.insert("calculus".to_string(), vec![]);

        let batch = estimate_topic_masteries(&topics, now(), None).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch["calculus"], 0.0);
        assert!((batch["geometry"] - 1.0).abs() < 1e-12);
        let single = estimate_mastery(&topics["algebra"], now(), None).unwrap();
        assert_eq!(batch["algebra"], single);
        let keys: Vec<_> = batch.keys().cloned().collect();
        assert_eq!(keys, vec!["algebra", "calculus", "geometry"]);
    }

    #[test]
    fn test_topic_batch_propagates_error() {
        let mut topics = HashMap::new();
        topics.insert(
            "future".to_string(),
            vec![AttemptRecord::new(true, now() + Duration::days(1))],
        );
        assert!(estimate_topic_masteries(&topics, now(), None).is_err());
    }

    #[test]
    fn test_count_mastered_topics() {
        let masteries = [0.95, 0.9, 0.89, 0.2];
        assert_eq!(count_mastered_topics(&masteries, 0.9), 2);
        assert_eq!(count_mastered_topics(Vec::<f64>::new().iter(), 0.9), 0);
    }
}
