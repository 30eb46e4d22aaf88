//! Whole-order quality metrics.
//!
//! Ranks finished attempts against each other and summarizes a conflict
//! list for reporting.
//!
//! # Aggregate score
//!
//! | Term | Weight |
//! |------|--------|
//! | Back-to-back conflicts (gap 0) | -1000 each |
//! | Conflicts with gap `g` in `1..min_gap` | -100/g each |
//! | Any conflict | -10 each |
//! | Distinct participants in conflict | -50 each |
//!
//! A conflict-free order short-circuits to [`PERFECT_SCORE`], so it beats
//! every order that has conflicts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::Conflict;

/// Score of an order with no conflicts.
pub const PERFECT_SCORE: f64 = 10_000.0;

const BACK_TO_BACK_WEIGHT: f64 = 1000.0;
const SHORT_GAP_WEIGHT: f64 = 100.0;
const PER_CONFLICT_WEIGHT: f64 = 10.0;
const PER_PARTICIPANT_WEIGHT: f64 = 50.0;

/// Scores a complete order from its conflicts. Higher is better.
pub fn aggregate_score(conflicts: &[Conflict], min_gap: usize) -> f64 {
    if conflicts.is_empty() {
        return PERFECT_SCORE;
    }

    let summary = ConflictSummary::from_conflicts(conflicts, min_gap);
    let mut score = -(summary.back_to_back as f64) * BACK_TO_BACK_WEIGHT;

    for gap in 1..min_gap {
        let count = summary.by_gap.get(gap).copied().unwrap_or(0);
        score -= count as f64 * (SHORT_GAP_WEIGHT / gap as f64);
    }

    score -= summary.total as f64 * PER_CONFLICT_WEIGHT;
    score -= summary.participants as f64 * PER_PARTICIPANT_WEIGHT;
    score
}

/// Conflict statistics for a running order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSummary {
    /// Total number of conflicts.
    pub total: usize,
    /// Conflicts with gap 0.
    pub back_to_back: usize,
    /// Conflict count per gap, indexed `0..min_gap`.
    pub by_gap: Vec<usize>,
    /// Distinct participants with at least one conflict.
    pub participants: usize,
}

impl ConflictSummary {
    /// Tallies `conflicts` against the gap threshold they were detected with.
    ///
    /// Gaps at or above `min_gap` cannot come out of the detector; they are
    /// still counted in `total` but have no `by_gap` bucket.
    pub fn from_conflicts(conflicts: &[Conflict], min_gap: usize) -> Self {
        let mut by_gap = vec![0; min_gap];
        let mut participants = HashSet::new();
        let mut back_to_back = 0;

        for conflict in conflicts {
            if conflict.is_back_to_back() {
                back_to_back += 1;
            }
            if let Some(bucket) = by_gap.get_mut(conflict.gap) {
                *bucket += 1;
            }
            participants.insert(conflict.participant_id.as_str());
        }

        Self {
            total: conflicts.len(),
            back_to_back,
            by_gap,
            participants: participants.len(),
        }
    }

    /// Whether the order has no conflicts.
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}
