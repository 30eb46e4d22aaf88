//! Multi-start greedy show-order optimizer.
//!
//! # Algorithm
//!
//! 1. Split included entities into pinned (locked with a slot) and free.
//! 2. Run a fixed number of attempts. Attempt 0 orders free entities by
//!    participant count, descending; later attempts shuffle them.
//! 3. Within an attempt, pinned entities are anchored at their slots and
//!    free entities form a sequence filling the remaining slots in order.
//!    Each step scores every unplaced entity at every insertion index and
//!    inserts the best pair; later entities shift to the next free slot.
//! 4. Detect conflicts of each finished attempt, score it, keep the best.
//!    Ties keep the earlier attempt.
//!
//! No backtracking: the result is a heuristic, not an optimum.
//!
//! # Complexity
//! O(a * n^3 * p) where a = attempts, n = free entities, p = participants
//! per entity.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::conflicts::detect_slotted;
use super::placement::{LastSeen, PlacementScorer};
use super::score::aggregate_score;
use crate::config::OptimizerConfig;
use crate::models::{Conflict, Entity};

/// Default number of attempts per optimization.
pub const DEFAULT_ATTEMPTS: usize = 5;

/// Input snapshot for one optimization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    /// Caller-assigned sequence number, echoed in the result.
    pub sequence: u64,
    /// Entities to order. Entities not `included` are ignored.
    pub entities: Vec<Entity>,
    /// Minimum number of slots between two appearances of a participant.
    pub min_gap: usize,
}

impl OptimizeRequest {
    /// Creates a request.
    pub fn new(entities: Vec<Entity>, min_gap: usize) -> Self {
        Self {
            sequence: 0,
            entities,
            min_gap,
        }
    }

    /// Sets the sequence number.
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}

/// Outcome of one optimization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResult {
    /// Sequence number of the originating request.
    pub sequence: u64,
    /// Included entities in slot order, free entities with fresh positions.
    pub ordered_entities: Vec<Entity>,
    /// Remaining gap violations of the chosen order.
    pub conflicts: Vec<Conflict>,
    /// Aggregate score of the chosen order.
    pub score: f64,
    /// Index of the winning attempt.
    pub attempt: usize,
}

/// Multi-start greedy show-order optimizer.
///
/// # Example
///
/// ```
/// use show_order::models::{Entity, Participant};
/// use show_order::scheduler::ShowOrderOptimizer;
///
/// let ada = Participant::new("1").with_name("Ada", "L");
/// let entities = vec![
///     Entity::new("Tap").with_participant(ada.clone()),
///     Entity::new("Jazz"),
///     Entity::new("Ballet").with_participant(ada),
/// ];
///
/// let result = ShowOrderOptimizer::new().with_seed(7).optimize(&entities, 1);
/// let names: Vec<&str> = result.ordered_entities.iter().map(|e| e.name.as_str()).collect();
/// assert_eq!(names, vec!["Tap", "Jazz", "Ballet"]);
/// assert!(result.conflicts.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ShowOrderOptimizer {
    attempts: usize,
    seed: Option<u64>,
}

impl ShowOrderOptimizer {
    /// Creates an optimizer with the default attempt count and OS seeding.
    pub fn new() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            seed: None,
        }
    }

    /// Creates an optimizer from configuration.
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            attempts: config.attempts.max(1),
            seed: config.seed,
        }
    }

    /// Sets the number of attempts (at least 1).
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Seeds the shuffles of attempts after the first.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of attempts per run.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Orders the included entities of `entities`.
    ///
    /// Never fails: when conflicts cannot be avoided the best order found
    /// is returned together with its conflicts.
    pub fn optimize(&self, entities: &[Entity], min_gap: usize) -> OptimizeResult {
        let min_gap = min_gap.max(1);
        let included: Vec<&Entity> = entities.iter().filter(|e| e.included).collect();
        if included.is_empty() {
            return OptimizeResult::default();
        }

        let mut pinned: Vec<(usize, &Entity)> = Vec::new();
        let mut free: Vec<&Entity> = Vec::new();
        for entity in included {
            match entity.position {
                Some(slot) if entity.locked => pinned.push((slot, entity)),
                _ => free.push(entity),
            }
        }
        pinned.sort_by_key(|&(slot, _)| slot);
        if pinned.windows(2).any(|w| w[0].0 == w[1].0) {
            warn!("several locked entities share a slot; they are kept as they are");
        }

        if free.is_empty() {
            let conflicts = detect_slotted(&pinned, min_gap);
            let score = aggregate_score(&conflicts, min_gap);
            return OptimizeResult {
                sequence: 0,
                ordered_entities: pinned.into_iter().map(|(_, e)| e.clone()).collect(),
                conflicts,
                score,
                attempt: 0,
            };
        }

        let scorer = PlacementScorer::new(min_gap);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut best: Option<(Vec<(usize, &Entity)>, Vec<Conflict>, f64, usize)> = None;

        for attempt in 0..self.attempts {
            let mut start = free.clone();
            if attempt == 0 {
                start.sort_by(|a, b| b.participant_count().cmp(&a.participant_count()));
            } else {
                start.shuffle(&mut rng);
            }

            let layout = Attempt::new(&pinned).run(start, &scorer);
            let conflicts = detect_slotted(&layout, min_gap);
            let score = aggregate_score(&conflicts, min_gap);
            debug!(attempt, score, conflicts = conflicts.len(), "attempt finished");

            if best.as_ref().map_or(true, |(_, _, s, _)| score > *s) {
                best = Some((layout, conflicts, score, attempt));
            }
        }

        let Some((layout, conflicts, score, attempt)) = best else {
            return OptimizeResult::default();
        };

        let ordered_entities = layout
            .into_iter()
            .map(|(slot, entity)| {
                let mut entity = entity.clone();
                if !entity.is_pinned() {
                    entity.position = Some(slot);
                }
                entity
            })
            .collect();

        info!(
            entities = entities.len(),
            min_gap,
            attempt,
            score,
            conflicts = conflicts.len(),
            "show order optimized"
        );

        OptimizeResult {
            sequence: 0,
            ordered_entities,
            conflicts,
            score,
            attempt,
        }
    }

    /// Runs a request, echoing its sequence number.
    pub fn optimize_request(&self, request: &OptimizeRequest) -> OptimizeResult {
        let mut result = self.optimize(&request.entities, request.min_gap);
        result.sequence = request.sequence;
        result
    }
}

impl Default for ShowOrderOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Orders the included entities with a default optimizer.
pub fn optimize(entities: &[Entity], min_gap: usize) -> OptimizeResult {
    ShowOrderOptimizer::new().optimize(entities, min_gap)
}

/// Working state of one constructive attempt.
struct Attempt<'a> {
    pinned: &'a [(usize, &'a Entity)],
    anchored: BTreeSet<usize>,
    placed: Vec<&'a Entity>,
    last_seen: LastSeen,
}

impl<'a> Attempt<'a> {
    fn new(pinned: &'a [(usize, &'a Entity)]) -> Self {
        let mut last_seen = LastSeen::new();
        for &(slot, entity) in pinned {
            last_seen.record(entity, slot);
        }
        Self {
            pinned,
            anchored: pinned.iter().map(|&(slot, _)| slot).collect(),
            placed: Vec::new(),
            last_seen,
        }
    }

    /// Places every entity of `unplaced` and returns the slotted layout.
    fn run(mut self, mut unplaced: Vec<&'a Entity>, scorer: &PlacementScorer) -> Vec<(usize, &'a Entity)> {
        while !unplaced.is_empty() {
            let slots = self.free_slots(self.placed.len() + 1);
            let mut best: Option<(usize, usize, f64)> = None;

            for (u, candidate) in unplaced.iter().enumerate() {
                for (index, &slot) in slots.iter().enumerate() {
                    let next = self.next_after(index, slot);
                    let score = scorer.score(candidate, slot, next, &self.last_seen);
                    if best.map_or(true, |(_, _, s)| score > s) {
                        best = Some((u, index, score));
                    }
                }
            }

            let Some((u, index, _)) = best else {
                warn!(remaining = unplaced.len(), "no placeable candidate; stopping attempt early");
                break;
            };

            let entity = unplaced.remove(u);
            self.last_seen.record(entity, slots[index]);
            self.placed.insert(index, entity);
        }

        self.layout()
    }

    /// First `count` slots not taken by an anchor.
    fn free_slots(&self, count: usize) -> Vec<usize> {
        (0..)
            .filter(|slot| !self.anchored.contains(slot))
            .take(count)
            .collect()
    }

    /// Entity that occupies `slot + 1` once something is inserted at `index`.
    fn next_after(&self, index: usize, slot: usize) -> Option<&'a Entity> {
        let following = slot + 1;
        if self.anchored.contains(&following) {
            return self
                .pinned
                .iter()
                .find(|&&(s, _)| s == following)
                .map(|&(_, e)| e);
        }
        self.placed.get(index).copied()
    }

    /// Pinned and placed entities by slot.
    fn layout(&self) -> Vec<(usize, &'a Entity)> {
        let slots = self.free_slots(self.placed.len());
        let mut layout: Vec<(usize, &'a Entity)> = self.pinned.to_vec();
        layout.extend(slots.into_iter().zip(self.placed.iter().copied()));
        layout.sort_by_key(|&(slot, _)| slot);
        layout
    }
}
