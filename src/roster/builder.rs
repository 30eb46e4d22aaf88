//! Entity construction from participants.

use std::collections::HashMap;

use crate::models::{Entity, Participant};

/// Groups participants into entities by entity name.
///
/// Entities appear in the order their name is first seen while walking
/// `participants` in order; each has its members in the same order, without
/// duplicates. New entities are included, unlocked and unplaced.
pub fn build_entities(participants: &[Participant]) -> Vec<Entity> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entities: Vec<Entity> = Vec::new();

    for participant in participants {
        for name in &participant.entity_names {
            let i = *index.entry(name.as_str()).or_insert_with(|| {
                entities.push(Entity::new(name.as_str()));
                entities.len() - 1
            });
            entities[i].add_participant(participant.clone());
        }
    }

    entities
}
