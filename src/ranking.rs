//! Ranking
//!
//! Orders a leaderboard snapshot: score descending, then the secondary key
//! ascending (earlier achiever first), then id ascending. The id tie-break
//! makes the order total, so output never depends on input order.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingCandidate<K> {
    pub id: String,
    pub score: f64,
    pub secondary_key: K,
}

impl<K> RankingCandidate<K> {
    pub fn new(id: impl Into<String>, score: f64, secondary_key: K) -> Self {
        Self {
            id: id.into(),
            score,
            secondary_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry<K> {
    /// 1-based
    pub rank: usize,
    pub candidate: RankingCandidate<K>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankPosition {
    pub rank: usize,
    pub total: usize,
    pub percentile: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking<K> {
    pub ordered: Vec<RankedEntry<K>>,
    pub rank_of: Option<RankPosition>,
}

impl<K> Ranking<K> {
    pub fn position(&self, id: &str) -> Option<RankPosition> {
        let total = self.ordered.len();
        self.ordered
            .iter()
            .find(|entry| entry.candidate.id == id)
            .map(|entry| RankPosition {
                rank: entry.rank,
                total,
                percentile: percentile(entry.rank, total),
            })
    }

    /// First `n` entries, for a leaderboard page
    pub fn top_n(&self, n: usize) -> &[RankedEntry<K>] {
        &self.ordered[..n.min(self.ordered.len())]
    }
}

/// `round((total - rank) / (total - 1) * 100)`; 100 when `total <= 1`
pub fn percentile(rank: usize, total: usize) -> u8 {
    if total <= 1 {
        return 100;
    }
    let rank = rank.clamp(1, total);
    let value = ((total - rank) as f64 / (total - 1) as f64 * 100.0).round();
    value.clamp(0.0, 100.0) as u8
}

/// `total_cmp` orders -0.0 below 0.0; equal scores must tie
fn score_key(score: f64) -> f64 {
    if score == 0.0 {
        0.0
    } else {
        score
    }
}

fn compare<K: Ord>(a: &RankingCandidate<K>, b: &RankingCandidate<K>) -> Ordering {
    score_key(b.score)
        .total_cmp(&score_key(a.score))
        .then_with(|| a.secondary_key.cmp(&b.secondary_key))
        .then_with(|| a.id.cmp(&b.id))
}

/// Rank `candidates` and, when `target_id` is given, report its position.
/// An unknown target yields `rank_of: None`. NaN scores and duplicate ids are
/// rejected.
pub fn rank<K: Ord + Clone>(
    candidates: &[RankingCandidate<K>],
    target_id: Option<&str>,
) -> EngineResult<Ranking<K>> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.score.is_nan() {
            return Err(EngineError::invalid(
                "score",
                format!("candidate `{}` has a NaN score", candidate.id),
            ));
        }
        if !seen.insert(candidate.id.as_str()) {
            return Err(EngineError::invalid(
                "candidates",
                format!("duplicate candidate id `{}`", candidate.id),
            ));
        }
    }

    let mut sorted = candidates.to_vec();
    sorted.sort_by(compare);

    let ordered: Vec<RankedEntry<K>> = sorted
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| RankedEntry {
            rank: i + 1,
            candidate,
        })
        .collect();

    let mut ranking = Ranking {
        ordered,
        rank_of: None,
    };
    let rank_of = target_id.and_then(|id| ranking.position(id));
    ranking.rank_of = rank_of;
    Ok(ranking)
}
