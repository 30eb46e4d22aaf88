//! Entity (class) model.
//!
//! An entity is the schedulable unit of a show: a named group of
//! participants that performs in one slot of the running order.
//!
//! # Scheduling metadata
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `position` | Zero-based slot, `None` until one is assigned |
//! | `locked` | Slot is pinned; the optimizer never moves it |
//! | `included` | Entity takes part in the show at all |
//! | `title` | Display label only, never affects scheduling |

use serde::{Deserialize, Serialize};

use super::Participant;

/// A schedulable group of participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique entity name.
    pub name: String,
    /// Members, duplicate-free, in the order they were added.
    pub participants: Vec<Participant>,
    /// Assigned slot (zero-based).
    pub position: Option<usize>,
    /// Whether `position` is pinned.
    pub locked: bool,
    /// Whether the entity takes part in the show.
    pub included: bool,
    /// Optional performance title.
    pub title: String,
}

impl Entity {
    /// Creates an included, unlocked, unplaced entity with no participants.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            participants: Vec::new(),
            position: None,
            locked: false,
            included: true,
            title: String::new(),
        }
    }

    /// Adds a participant unless one with the same ID is already present.
    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.add_participant(participant);
        self
    }

    /// Sets the slot.
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Pins the entity at `position`.
    pub fn locked_at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self.locked = true;
        self
    }

    /// Marks the entity as left out of the show.
    pub fn excluded(mut self) -> Self {
        self.included = false;
        self
    }

    /// Sets the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Adds a participant; returns `false` if the ID was already a member.
    pub fn add_participant(&mut self, participant: Participant) -> bool {
        if self.has_participant(&participant.id) {
            return false;
        }
        self.participants.push(participant);
        true
    }

    /// Whether a participant with this ID is a member.
    pub fn has_participant(&self, participant_id: &str) -> bool {
        self.participants.iter().any(|p| p.id == participant_id)
    }

    /// Number of members.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Whether the optimizer must keep this entity where it is.
    ///
    /// A locked entity without a slot has nothing to pin and is placed
    /// like any other.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.locked && self.position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str) -> Participant {
        Participant::new(id).with_name(id, "Doe")
    }

    #[test]
    fn test_entity_defaults() {
        let e = Entity::new("Ballet 1");
        assert_eq!(e.name, "Ballet 1");
        assert_eq!(e.position, None);
        assert!(!e.locked);
        assert!(e.included);
        assert!(e.title.is_empty());
        assert!(!e.is_pinned());
    }

    #[test]
    fn test_participants_are_unique() {
        let mut e = Entity::new("Tap").with_participant(member("a"));
        assert!(!e.add_participant(member("a")));
        assert!(e.add_participant(member("b")));
        assert_eq!(e.participant_count(), 2);
        assert!(e.has_participant("b"));
        assert!(!e.has_participant("z"));
    }

    #[test]
    fn test_pinned_requires_position() {
        let mut e = Entity::new("Jazz");
        e.locked = true;
        assert!(!e.is_pinned());

        let e = Entity::new("Jazz").locked_at(3);
        assert!(e.is_pinned());
        assert_eq!(e.position, Some(3));
    }
}
