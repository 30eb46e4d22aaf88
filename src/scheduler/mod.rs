//! Running-order optimization and conflict scoring.
//!
//! # Algorithm
//!
//! `ShowOrderOptimizer` is a multi-start constructive greedy: every attempt
//! inserts the best-scoring (entity, slot) pair until all free entities are
//! placed, around entities pinned to fixed slots. The attempt with the best
//! aggregate score wins. It is not optimal, but fast enough to re-run after
//! every edit.
//!
//! # Scoring
//!
//! - `PlacementScorer` rates a single insertion during construction.
//! - `aggregate_score` rates a finished order from its exact conflict list.
//! - `ConflictSummary` breaks a conflict list down for reporting.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 14
//! - Marti et al. (2013), "Multi-start methods for combinatorial optimization"

mod conflicts;
mod optimizer;
mod placement;
mod score;

pub use conflicts::detect_conflicts;
pub use optimizer::{optimize, OptimizeRequest, OptimizeResult, ShowOrderOptimizer, DEFAULT_ATTEMPTS};
pub use placement::{
    LastSeen, PlacementScorer, ADEQUATE_GAP_REWARD, BACK_TO_BACK_PENALTY, CLEAN_INSERTION_BONUS,
    NEW_PARTICIPANT_BONUS, SHORT_GAP_SCALE,
};
pub use score::{aggregate_score, ConflictSummary, PERFECT_SCORE};
