//! Exact conflict detection.
//!
//! # Algorithm
//!
//! 1. Sort the order by resolved slot (stable).
//! 2. For every participant, collect the slots they appear in.
//! 3. For each consecutive pair of appearances, `gap = next - prev - 1`;
//!    a gap below `min_gap` is a conflict.
//!
//! Participants are visited in order of first appearance, so the same
//! order always yields the same conflict list.
//!
//! # Complexity
//! O(n log n + m) where n = entities, m = participant memberships.

use std::collections::HashMap;

use crate::models::{Conflict, Entity, Participant};

/// Detects gap violations in a running order.
///
/// The slot of each entity is its `position`, or its index in `order` when
/// it has none.
pub fn detect_conflicts(order: &[Entity], min_gap: usize) -> Vec<Conflict> {
    let slotted: Vec<(usize, &Entity)> = order
        .iter()
        .enumerate()
        .map(|(index, entity)| (entity.position.unwrap_or(index), entity))
        .collect();
    detect_slotted(&slotted, min_gap)
}

/// Detects gap violations in an explicitly slotted layout.
pub(crate) fn detect_slotted(layout: &[(usize, &Entity)], min_gap: usize) -> Vec<Conflict> {
    let mut by_slot = layout.to_vec();
    by_slot.sort_by_key(|&(slot, _)| slot);

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut appearances: Vec<(&Participant, Vec<(usize, &str)>)> = Vec::new();

    for &(slot, entity) in &by_slot {
        for participant in &entity.participants {
            let i = *index.entry(participant.id.as_str()).or_insert_with(|| {
                appearances.push((participant, Vec::new()));
                appearances.len() - 1
            });
            appearances[i].1.push((slot, entity.name.as_str()));
        }
    }

    let mut conflicts = Vec::new();
    for (participant, slots) in &appearances {
        for pair in slots.windows(2) {
            let (prev_slot, prev_name) = pair[0];
            let (next_slot, next_name) = pair[1];
            // Colliding slots only come from malformed locks; treat as adjacent.
            let gap = (next_slot - prev_slot).saturating_sub(1);
            if gap < min_gap {
                conflicts.push(Conflict::new(
                    participant.id.as_str(),
                    participant.display_name(),
                    prev_name,
                    next_name,
                    gap,
                ));
            }
        }
    }

    conflicts
}
