//! Placement scoring for the constructive search.
//!
//! Scores inserting one unplaced entity at one candidate slot, given where
//! each participant was last seen in the partial order.
//!
//! # Terms (per participant of the candidate)
//!
//! | Situation | Score |
//! |-----------|-------|
//! | Never seen before | +5 |
//! | Gap 0 (back-to-back) | -5000 |
//! | Gap `g < min_gap`, `g != 0` | -100 * (min_gap - g)^3 |
//! | Gap `>= min_gap` | +10 |
//!
//! The gap is signed: `slot - last - 1`. A slot in front of the last
//! appearance yields a negative gap and the steepest short-gap penalties.
//!
//! Two further terms apply once per candidate:
//! - one-step lookahead: each participant of the entity that would follow
//!   the candidate slot whose recorded slot, after tentatively recording the
//!   candidate there, equals the candidate slot costs another -5000;
//! - a flat +1000 when none of the candidate's participants is back-to-back.

use std::collections::HashMap;

use crate::models::Entity;

/// Bonus for a participant with no earlier appearance.
pub const NEW_PARTICIPANT_BONUS: f64 = 5.0;
/// Penalty for an appearance in the adjacent slot.
pub const BACK_TO_BACK_PENALTY: f64 = 5000.0;
/// Scale of the cubic short-gap penalty.
pub const SHORT_GAP_SCALE: f64 = 100.0;
/// Reward for a participant whose gap meets the threshold.
pub const ADEQUATE_GAP_REWARD: f64 = 10.0;
/// Flat bonus for insertions without any back-to-back participant.
pub const CLEAN_INSERTION_BONUS: f64 = 1000.0;

/// Last slot each participant was placed in, for one attempt.
///
/// Entries are overwritten with the realized slot of each insertion and are
/// not shifted when later insertions push entities right.
#[derive(Debug, Clone, Default)]
pub struct LastSeen {
    slots: HashMap<String, usize>,
}

impl LastSeen {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every participant of `entity` at `slot`.
    pub fn record(&mut self, entity: &Entity, slot: usize) {
        for participant in &entity.participants {
            self.slots.insert(participant.id.clone(), slot);
        }
    }

    /// Last recorded slot of a participant.
    pub fn get(&self, participant_id: &str) -> Option<usize> {
        self.slots.get(participant_id).copied()
    }

    /// Number of participants seen.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no participant has been seen.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Scores candidate insertions against a partial order.
#[derive(Debug, Clone, Copy)]
pub struct PlacementScorer {
    min_gap: usize,
}

impl PlacementScorer {
    /// Creates a scorer for the given gap threshold (clamped to at least 1).
    pub fn new(min_gap: usize) -> Self {
        Self {
            min_gap: min_gap.max(1),
        }
    }

    /// Gap threshold in use.
    pub fn min_gap(&self) -> usize {
        self.min_gap
    }

    /// Scores inserting `candidate` at `slot`. Higher is better.
    ///
    /// `next` is the entity that would occupy `slot + 1` after the insertion,
    /// if any.
    pub fn score(
        &self,
        candidate: &Entity,
        slot: usize,
        next: Option<&Entity>,
        last_seen: &LastSeen,
    ) -> f64 {
        let mut score = 0.0;
        let mut back_to_back = 0usize;

        for participant in &candidate.participants {
            let Some(last) = last_seen.get(&participant.id) else {
                score += NEW_PARTICIPANT_BONUS;
                continue;
            };

            let gap = slot as i64 - last as i64 - 1;
            let min_gap = self.min_gap as i64;
            if gap == 0 {
                back_to_back += 1;
                score -= BACK_TO_BACK_PENALTY;
            } else if gap < min_gap {
                let shortfall = (min_gap - gap) as f64;
                score -= shortfall.powi(3) * SHORT_GAP_SCALE;
            } else {
                score += ADEQUATE_GAP_REWARD;
            }
        }

        if let Some(next) = next {
            for participant in &next.participants {
                let recorded = if candidate.has_participant(&participant.id) {
                    Some(slot)
                } else {
                    last_seen.get(&participant.id)
                };
                if recorded == Some(slot) {
                    score -= BACK_TO_BACK_PENALTY;
                }
            }
        }

        if back_to_back == 0 {
            score += CLEAN_INSERTION_BONUS;
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Participant;

    fn entity(name: &str, members: &[&str]) -> Entity {
        members
            .iter()
            .fold(Entity::new(name), |e, id| e.with_participant(Participant::new(*id)))
    }

    #[test]
    fn test_fresh_participants() {
        let scorer = PlacementScorer::new(2);
        let e = entity("A", &["p", "q"]);
        let score = scorer.score(&e, 0, None, &LastSeen::new());
        assert!((score - (2.0 * NEW_PARTICIPANT_BONUS + CLEAN_INSERTION_BONUS)).abs() < 1e-10);
    }

    #[test]
    fn test_back_to_back_dominates() {
        let scorer = PlacementScorer::new(3);
        let mut seen = LastSeen::new();
        seen.record(&entity("X", &["p"]), 0);

        let e = entity("A", &["p"]);
        let adjacent = scorer.score(&e, 1, None, &seen);
        let gap_one = scorer.score(&e, 2, None, &seen);
        let enough = scorer.score(&e, 4, None, &seen);

        assert!((adjacent - -BACK_TO_BACK_PENALTY).abs() < 1e-10);
        // (3 - 1)^3 * 100 = 800, no back-to-back so +1000
        assert!((gap_one - 200.0).abs() < 1e-10);
        assert!((enough - (ADEQUATE_GAP_REWARD + CLEAN_INSERTION_BONUS)).abs() < 1e-10);
        assert!(adjacent < gap_one && gap_one < enough);
    }

    #[test]
    fn test_cubic_prefers_larger_short_gaps() {
        let scorer = PlacementScorer::new(4);
        let mut seen = LastSeen::new();
        seen.record(&entity("X", &["p"]), 0);
        let e = entity("A", &["p"]);

        let g1 = scorer.score(&e, 2, None, &seen);
        let g2 = scorer.score(&e, 3, None, &seen);
        let g3 = scorer.score(&e, 4, None, &seen);
        assert!(g1 < g2 && g2 < g3);
    }

    #[test]
    fn test_slot_before_last_appearance_is_short_gap() {
        let scorer = PlacementScorer::new(1);
        let mut seen = LastSeen::new();
        seen.record(&entity("L", &["p"]), 3);
        let e = entity("A", &["p"]);

        // gap = 0 - 3 - 1 = -4, (1 + 4)^3 * 100 = 12500
        let in_front = scorer.score(&e, 0, None, &seen);
        assert!((in_front - (CLEAN_INSERTION_BONUS - 12_500.0)).abs() < 1e-10);
        assert!(in_front < scorer.score(&e, 4, None, &seen));

        // gap = 3 - 3 - 1 = -1, (1 + 1)^3 * 100 = 800
        let same_slot = scorer.score(&e, 3, None, &seen);
        assert!((same_slot - (CLEAN_INSERTION_BONUS - 800.0)).abs() < 1e-10);
    }

    #[test]
    fn test_lookahead_penalizes_shared_next() {
        let scorer = PlacementScorer::new(1);
        let seen = LastSeen::new();
        let e = entity("A", &["p", "q"]);
        let next = entity("B", &["q", "r"]);

        let without = scorer.score(&e, 0, None, &seen);
        let with = scorer.score(&e, 0, Some(&next), &seen);
        assert!((without - with - BACK_TO_BACK_PENALTY).abs() < 1e-10);

        let unrelated = entity("C", &["z"]);
        assert_eq!(scorer.score(&e, 0, Some(&unrelated), &seen), without);
    }

    #[test]
    fn test_lookahead_discourages_pushing_recorded_entity() {
        // "B" was just placed at slot 0; inserting in front of it costs the
        // back-to-back penalty for each of its participants.
        let scorer = PlacementScorer::new(1);
        let next = entity("B", &["r", "s"]);
        let mut seen = LastSeen::new();
        seen.record(&next, 0);

        let e = entity("A", &["p"]);
        let in_front = scorer.score(&e, 0, Some(&next), &seen);
        let at_end = scorer.score(&e, 1, None, &seen);
        assert!((at_end - in_front - 2.0 * BACK_TO_BACK_PENALTY).abs() < 1e-10);
    }

    #[test]
    fn test_min_gap_is_clamped() {
        assert_eq!(PlacementScorer::new(0).min_gap(), 1);
    }

    #[test]
    fn test_last_seen_overwrites() {
        let mut seen = LastSeen::new();
        assert!(seen.is_empty());
        seen.record(&entity("A", &["p", "q"]), 1);
        seen.record(&entity("B", &["q"]), 4);
        assert_eq!(seen.get("p"), Some(1));
        assert_eq!(seen.get("q"), Some(4));
        assert_eq!(seen.get("z"), None);
        assert_eq!(seen.len(), 2);
    }
}
