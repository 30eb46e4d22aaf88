//! Show domain models.
//!
//! Provides the data types for describing a show and its running order.
//!
//! # Domain Mappings
//!
//! | Model | Recital | Conference | Festival |
//! |-------|---------|------------|----------|
//! | Participant | Student | Speaker | Artist |
//! | Entity | Class routine | Session | Set |
//! | Show | Recital program | Track schedule | Stage lineup |
//! | Conflict | Quick change | Back-to-back talks | Double booking |

mod conflict;
mod entity;
mod participant;
mod show;

pub use conflict::Conflict;
pub use entity::Entity;
pub use participant::Participant;
pub use show::{Edit, Show};
