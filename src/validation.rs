//! Input validation for show-order problems.
//!
//! Checks structural integrity of the entities before optimization.
//! Detects:
//! - Duplicate entity names
//! - Entities without participants
//! - Locked entities sharing a slot
//! - A zero gap threshold
//!
//! None of these stop the optimizer, which clamps or tolerates each of
//! them; they are reported so that callers can surface them.

use std::collections::{HashMap, HashSet};

use crate::models::Entity;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same name.
    DuplicateName,
    /// An included entity has no participants.
    EmptyEntity,
    /// Two included locked entities are pinned to the same slot.
    LockedSlotCollision,
    /// The gap threshold is zero.
    InvalidMinGap,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the entities of a show.
///
/// Checks:
/// 1. No duplicate entity names (included or not)
/// 2. Every included entity has at least one participant
/// 3. No two included, pinned entities share a slot
/// 4. `min_gap >= 1`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_entities(entities: &[Entity], min_gap: usize) -> ValidationResult {
    let mut errors = Vec::new();

    if min_gap == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidMinGap,
            "Minimum gap must be at least 1",
        ));
    }

    let mut names = HashSet::new();
    for entity in entities {
        if !names.insert(entity.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate entity name: {}", entity.name),
            ));
        }
    }

    for entity in entities.iter().filter(|e| e.included) {
        if entity.participants.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyEntity,
                format!("Entity '{}' has no participants", entity.name),
            ));
        }
    }

    let mut pinned: HashMap<usize, &str> = HashMap::new();
    for entity in entities.iter().filter(|e| e.included) {
        let Some(slot) = entity.position.filter(|_| entity.locked) else {
            continue;
        };
        if let Some(first) = pinned.insert(slot, entity.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::LockedSlotCollision,
                format!(
                    "Entities '{}' and '{}' are both locked at slot {}",
                    first, entity.name, slot
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
