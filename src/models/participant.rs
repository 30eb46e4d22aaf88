//! Participant (performer) model.
//!
//! A participant appears in one or more entities. The roster lists, per
//! participant, the names of the entities they belong to; entities are
//! later derived from those name tokens.

use serde::{Deserialize, Serialize};

/// A performer drawn from the roster.
///
/// Immutable once loaded, except that ingestion merges the entity lists of
/// rows sharing the same id (see [`Participant::merge_entities`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique participant identifier.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Names of the entities this participant belongs to, first-seen order.
    pub entity_names: Vec<String>,
}

impl Participant {
    /// Creates a participant with the given ID and no entities.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: String::new(),
            last_name: String::new(),
            entity_names: Vec::new(),
        }
    }

    /// Sets the participant's name.
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Adds an entity membership. Duplicates are ignored.
    pub fn with_entity(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.entity_names.contains(&name) {
            self.entity_names.push(name);
        }
        self
    }

    /// Display name: `"{first} {last}"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Unions `names` into this participant's memberships.
    ///
    /// Existing order is kept; unseen names are appended in the order given.
    pub fn merge_entities<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.entity_names.contains(&name) {
                self.entity_names.push(name);
            }
        }
    }
}
