//! Conflict model.
//!
//! A conflict records that one participant performs twice with fewer than
//! `min_gap` other entities in between. Conflicts are derived data: they are
//! rebuilt on every optimization and never edited in place.

use serde::{Deserialize, Serialize};

/// Two appearances of the same participant that are too close together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Participant ID.
    pub participant_id: String,
    /// Participant display name.
    pub participant_name: String,
    /// Entity names, earlier slot first.
    pub entity_names: [String; 2],
    /// Number of slots strictly between the two appearances.
    pub gap: usize,
}

impl Conflict {
    /// Creates a conflict.
    pub fn new(
        participant_id: impl Into<String>,
        participant_name: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
        gap: usize,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            participant_name: participant_name.into(),
            entity_names: [first.into(), second.into()],
            gap,
        }
    }

    /// Whether the two appearances are in adjacent slots.
    #[inline]
    pub fn is_back_to_back(&self) -> bool {
        self.gap == 0
    }

    /// Whether this conflict involves the given entity.
    pub fn involves(&self, entity_name: &str) -> bool {
        self.entity_names.iter().any(|n| n == entity_name)
    }
}
