//! Roster ingestion.
//!
//! Turns a performer roster (CSV) into participants, and participants into
//! the entities of a show.
//!
//! # Pipeline
//!
//! ```text
//! roster.csv ──parse_roster──▶ Vec<Participant> ──build_entities──▶ Vec<Entity>
//! ```

mod builder;
mod ingest;

pub use builder::build_entities;
pub use ingest::{load_roster, parse_roster, RosterOptions};
