//! Show (working set) model.
//!
//! Holds every entity of a show, included or not, together with the gap
//! threshold and the conflicts of the last applied optimization. Edits
//! report whether they change the scheduling problem so the caller knows
//! when to re-run the optimizer.
//!
//! Optimization requests are numbered. [`Show::apply`] ignores a result
//! older than the newest one already applied, and a result whose request
//! was issued before the latest structural edit, so a slow pass never
//! overwrites a newer order or undoes a manual move.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Conflict, Entity, Participant};
use crate::error::ShowError;
use crate::roster::build_entities;
use crate::scheduler::{OptimizeRequest, OptimizeResult, ShowOrderOptimizer};

/// Effect of an edit on the scheduling problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// The problem changed; the optimizer must run again.
    Structural,
    /// Only display data changed.
    Cosmetic,
    /// Nothing changed.
    Unchanged,
}

impl Edit {
    /// Whether the optimizer must run after this edit.
    #[inline]
    pub fn needs_optimization(self) -> bool {
        self == Edit::Structural
    }
}

/// The entities of one show and their current running order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    /// All entities, in creation order.
    pub entities: Vec<Entity>,
    /// Minimum number of slots between two appearances of a participant.
    pub min_gap: usize,
    /// Conflicts of the last applied optimization.
    pub conflicts: Vec<Conflict>,
    #[serde(skip)]
    issued: u64,
    #[serde(skip)]
    applied: Option<u64>,
    #[serde(skip)]
    edited: Option<u64>,
}

type EditResult = Result<Edit, ShowError>;

impl Show {
    /// Creates a show (`min_gap` is clamped to at least 1).
    pub fn new(entities: Vec<Entity>, min_gap: usize) -> Self {
        Self {
            entities,
            min_gap: min_gap.max(1),
            conflicts: Vec::new(),
            issued: 0,
            applied: None,
            edited: None,
        }
    }

    /// Creates a show with one entity per distinct entity name of the roster.
    pub fn from_participants(participants: &[Participant], min_gap: usize) -> Self {
        Self::new(build_entities(participants), min_gap)
    }

    /// Conflicts of the last applied optimization that involve `name`.
    pub fn conflicts_involving<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Conflict> {
        self.conflicts.iter().filter(move |c| c.involves(name))
    }

    /// Finds an entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    fn entity_mut(&mut self, name: &str) -> Result<&mut Entity, ShowError> {
        self.entities
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| ShowError::UnknownEntity(name.to_string()))
    }

    /// Included entities, in creation order.
    pub fn included(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.included)
    }

    /// Number of included entities.
    pub fn included_count(&self) -> usize {
        self.included().count()
    }

    /// Included entities sorted by slot; unplaced ones last.
    pub fn running_order(&self) -> Vec<&Entity> {
        let mut order: Vec<&Entity> = self.included().collect();
        order.sort_by_key(|e| e.position.unwrap_or(usize::MAX));
        order
    }

    /// Includes or excludes an entity.
    ///
    /// An excluded entity loses its slot. A re-included entity without a
    /// slot is appended at the end, unlocked.
    pub fn toggle_included(&mut self, name: &str) -> EditResult {
        let entity = self.entity_mut(name)?;
        entity.included = !entity.included;
        if !entity.included {
            entity.position = None;
            return Ok(self.structural());
        }

        if entity.position.is_none() {
            let last = self.included_count() - 1;
            let entity = self.entity_mut(name)?;
            entity.position = Some(last);
            entity.locked = false;
        }
        Ok(self.structural())
    }

    /// Pins or unpins an entity.
    pub fn toggle_locked(&mut self, name: &str) -> EditResult {
        let entity = self.entity_mut(name)?;
        entity.locked = !entity.locked;
        Ok(self.structural())
    }

    /// Moves an included entity to `slot` (zero-based) and pins it there.
    ///
    /// The other included entities are re-packed around it in their current
    /// order so that slots stay unique.
    pub fn set_position(&mut self, name: &str, slot: usize) -> EditResult {
        let included = self.included_count();
        let entity = self.entity_mut(name)?;
        if !entity.included {
            return Err(ShowError::NotIncluded(name.to_string()));
        }
        if slot >= included {
            return Err(ShowError::PositionOutOfRange { slot, included });
        }
        entity.locked = true;

        let mut others: Vec<usize> = self
            .entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.included && e.name != name)
            .map(|(i, _)| i)
            .collect();
        others.sort_by_key(|&i| self.entities[i].position.unwrap_or(usize::MAX));

        let moved = self
            .entities
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| ShowError::UnknownEntity(name.to_string()))?;
        others.insert(slot, moved);

        for (new_slot, index) in others.into_iter().enumerate() {
            self.entities[index].position = Some(new_slot);
        }
        Ok(self.structural())
    }

    /// Name the next duplicate of `name` would get.
    ///
    /// `"X (Copy)"`, then `"X (Copy 2)"`, `"X (Copy 3)"`, ... whichever is
    /// free first.
    pub fn copy_name(&self, name: &str) -> String {
        let mut candidate = format!("{name} (Copy)");
        let mut counter = 1;
        while self.entity(&candidate).is_some() {
            counter += 1;
            candidate = format!("{name} (Copy {counter})");
        }
        candidate
    }

    /// Adds a copy of an entity with the same participants and title.
    ///
    /// The copy is included, unlocked and unplaced.
    pub fn duplicate(&mut self, name: &str) -> EditResult {
        let original = self
            .entity(name)
            .ok_or_else(|| ShowError::UnknownEntity(name.to_string()))?;

        let mut copy = original.clone();
        copy.name = self.copy_name(name);
        copy.position = None;
        copy.locked = false;
        copy.included = true;

        debug!(original = name, copy = %copy.name, "entity duplicated");
        self.entities.push(copy);
        Ok(self.structural())
    }

    /// Removes an entity from the show.
    pub fn remove(&mut self, name: &str) -> EditResult {
        let before = self.entities.len();
        self.entities.retain(|e| e.name != name);
        if self.entities.len() == before {
            return Err(ShowError::UnknownEntity(name.to_string()));
        }
        Ok(self.structural())
    }

    /// Sets the display title of an entity.
    pub fn set_title(&mut self, name: &str, title: impl Into<String>) -> EditResult {
        self.entity_mut(name)?.title = title.into();
        Ok(Edit::Cosmetic)
    }

    /// Changes the gap threshold.
    pub fn set_min_gap(&mut self, min_gap: usize) -> EditResult {
        if min_gap == 0 {
            return Err(ShowError::InvalidMinGap);
        }
        if min_gap == self.min_gap {
            return Ok(Edit::Unchanged);
        }
        self.min_gap = min_gap;
        Ok(self.structural())
    }

    /// Clears the slot of every included, unlocked entity.
    ///
    /// Used before an explicit full re-optimization.
    pub fn reset_unlocked_positions(&mut self) -> Edit {
        for entity in self.entities.iter_mut().filter(|e| e.included && !e.locked) {
            entity.position = None;
        }
        self.structural()
    }

    /// Marks every request issued so far as outdated.
    fn structural(&mut self) -> Edit {
        self.edited = Some(self.issued);
        Edit::Structural
    }

    /// Snapshots the included entities into a numbered request.
    pub fn request(&mut self) -> OptimizeRequest {
        self.issued += 1;
        let entities = self.included().cloned().collect();
        OptimizeRequest::new(entities, self.min_gap).with_sequence(self.issued)
    }

    /// Writes an optimization result back.
    ///
    /// Only slots of included, unpinned entities are updated. Returns
    /// `false` and leaves the show untouched when a newer result has
    /// already been applied or the request predates a structural edit.
    pub fn apply(&mut self, result: OptimizeResult) -> bool {
        let sequence = result.sequence;
        if self.applied.is_some_and(|applied| sequence <= applied) {
            debug!(sequence, "stale optimization result ignored");
            return false;
        }
        if self.edited.is_some_and(|edited| sequence <= edited) {
            debug!(sequence, "optimization result predates an edit; ignored");
            return false;
        }

        for ordered in &result.ordered_entities {
            let Some(entity) = self
                .entities
                .iter_mut()
                .find(|e| e.name == ordered.name && e.included)
            else {
                continue;
            };
            if !entity.is_pinned() {
                entity.position = ordered.position;
            }
        }

        self.conflicts = result.conflicts;
        self.applied = Some(sequence);
        true
    }

    /// Runs the optimizer in place and applies its result.
    pub fn reoptimize(&mut self, optimizer: &ShowOrderOptimizer) -> &[Conflict] {
        let request = self.request();
        let result = optimizer.optimize_request(&request);
        self.apply(result);
        &self.conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, members: &[&str]) -> Entity {
        members
            .iter()
            .fold(Entity::new(name), |e, id| e.with_participant(Participant::new(*id)))
    }

    fn sample_show() -> Show {
        Show::new(
            vec![
                entity("A", &["p", "q"]),
                entity("B", &["q"]),
                entity("C", &["r"]),
                entity("D", &["p"]),
            ],
            1,
        )
    }

    fn positions(show: &Show) -> Vec<usize> {
        let mut slots: Vec<usize> = show.included().filter_map(|e| e.position).collect();
        slots.sort_unstable();
        slots
    }

    #[test]
    fn test_from_participants() {
        let roster = vec![
            Participant::new("1").with_entity("Tap").with_entity("Jazz"),
            Participant::new("2").with_entity("Jazz"),
        ];
        let show = Show::from_participants(&roster, 0);
        assert_eq!(show.min_gap, 1);
        assert_eq!(show.entities.len(), 2);
        assert_eq!(show.entity("Jazz").unwrap().participant_count(), 2);
    }

    #[test]
    fn test_duplicate_naming() {
        let mut show = Show::new(
            vec![
                entity("X", &["p"]).locked_at(0).with_title("Opening"),
                entity("X (Copy)", &["p"]),
            ],
            2,
        );

        assert_eq!(show.duplicate("X"), Ok(Edit::Structural));
        let copy = show.entity("X (Copy 2)").unwrap();
        assert!(copy.included);
        assert!(!copy.locked);
        assert_eq!(copy.position, None);
        assert_eq!(copy.title, "Opening");
        assert_eq!(copy.participant_count(), 1);

        assert_eq!(show.copy_name("X"), "X (Copy 3)");
        assert_eq!(show.copy_name("Y"), "Y (Copy)");
    }

    #[test]
    fn test_duplicate_unknown() {
        let mut show = sample_show();
        assert_eq!(
            show.duplicate("nope"),
            Err(ShowError::UnknownEntity("nope".into()))
        );
    }

    #[test]
    fn test_set_position_locks_and_repacks() {
        let mut show = sample_show();
        show.reoptimize(&ShowOrderOptimizer::new().with_seed(1));
        assert_eq!(positions(&show), vec![0, 1, 2, 3]);

        assert_eq!(show.set_position("C", 0), Ok(Edit::Structural));
        let c = show.entity("C").unwrap();
        assert!(c.locked);
        assert_eq!(c.position, Some(0));
        assert_eq!(positions(&show), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_set_position_validation() {
        let mut show = sample_show();
        assert_eq!(
            show.set_position("A", 4),
            Err(ShowError::PositionOutOfRange {
                slot: 4,
                included: 4
            })
        );
        show.toggle_included("B").unwrap();
        assert_eq!(
            show.set_position("B", 0),
            Err(ShowError::NotIncluded("B".into()))
        );
    }

    #[test]
    fn test_locked_survives_reoptimize() {
        let mut show = sample_show();
        let optimizer = ShowOrderOptimizer::new().with_seed(4);
        show.reoptimize(&optimizer);
        show.set_position("D", 2).unwrap();

        for _ in 0..3 {
            show.reoptimize(&optimizer);
            assert_eq!(show.entity("D").unwrap().position, Some(2));
            assert_eq!(positions(&show), vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_toggle_included() {
        let mut show = sample_show();
        show.reoptimize(&ShowOrderOptimizer::new().with_seed(2));

        assert_eq!(show.toggle_included("A"), Ok(Edit::Structural));
        assert_eq!(show.included_count(), 3);
        assert_eq!(show.entity("A").unwrap().position, None);

        show.toggle_included("A").unwrap();
        let a = show.entity("A").unwrap();
        assert!(a.included);
        assert_eq!(a.position, Some(3));
        assert!(!a.locked);
    }

    #[test]
    fn test_title_is_cosmetic() {
        let mut show = sample_show();
        assert_eq!(show.set_title("A", "Finale"), Ok(Edit::Cosmetic));
        assert!(!show.set_title("A", "x").unwrap().needs_optimization());
        assert_eq!(show.entity("A").unwrap().title, "x");
    }

    #[test]
    fn test_structural_edits_need_optimization() {
        let mut show = sample_show();
        assert!(show.toggle_locked("A").unwrap().needs_optimization());
        assert!(show.remove("B").unwrap().needs_optimization());
        assert!(show.set_min_gap(3).unwrap().needs_optimization());
        assert_eq!(show.set_min_gap(3), Ok(Edit::Unchanged));
        assert_eq!(show.set_min_gap(0), Err(ShowError::InvalidMinGap));
        assert_eq!(show.remove("B"), Err(ShowError::UnknownEntity("B".into())));
    }

    #[test]
    fn test_stale_result_ignored() {
        let mut show = sample_show();
        let optimizer = ShowOrderOptimizer::new().with_seed(9);

        let first = show.request();
        let second = show.request();
        assert!(second.sequence > first.sequence);

        let newer = optimizer.optimize_request(&second);
        let older = optimizer.optimize_request(&first);
        assert!(show.apply(newer));
        let snapshot = show.entities.clone();

        assert!(!show.apply(older));
        assert_eq!(show.entities, snapshot);
    }

    #[test]
    fn test_result_issued_before_edit_ignored() {
        let mut show = sample_show();
        let request = show.request();
        let result = ShowOrderOptimizer::new().with_seed(6).optimize_request(&request);

        show.set_position("A", 3).unwrap();
        let moved = show.entities.clone();
        assert!(!show.apply(result));
        assert_eq!(show.entities, moved);
        assert_eq!(positions(&show), vec![0, 1, 2, 3]);

        show.reoptimize(&ShowOrderOptimizer::new().with_seed(6));
        assert_eq!(show.entity("A").unwrap().position, Some(3));
        assert_eq!(positions(&show), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cosmetic_edit_keeps_pending_result() {
        let mut show = sample_show();
        let request = show.request();
        let result = ShowOrderOptimizer::new().with_seed(6).optimize_request(&request);

        show.set_title("A", "Finale").unwrap();
        assert!(show.apply(result));
        assert_eq!(positions(&show), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_conflicts_involving() {
        let mut show = Show::new(vec![entity("A", &["p"]), entity("B", &["p"])], 1);
        show.reoptimize(&ShowOrderOptimizer::new().with_seed(1));
        assert_eq!(show.conflicts.len(), 1);
        assert_eq!(show.conflicts_involving("A").count(), 1);
        assert_eq!(show.conflicts_involving("B").count(), 1);
        assert_eq!(show.conflicts_involving("C").count(), 0);
    }

    #[test]
    fn test_reset_unlocked_positions() {
        let mut show = sample_show();
        show.reoptimize(&ShowOrderOptimizer::new().with_seed(3));
        show.set_position("A", 1).unwrap();
        show.reset_unlocked_positions();

        assert_eq!(show.entity("A").unwrap().position, Some(1));
        assert!(show
            .included()
            .filter(|e| e.name != "A")
            .all(|e| e.position.is_none()));
    }

    #[test]
    fn test_running_order() {
        let mut show = sample_show();
        show.reoptimize(&ShowOrderOptimizer::new().with_seed(5));
        let order = show.running_order();
        assert_eq!(order.len(), 4);
        for (slot, entity) in order.iter().enumerate() {
            assert_eq!(entity.position, Some(slot));
        }
    }
}
