//! Running-order optimizer for recitals and other multi-act shows.
//!
//! Given a roster of performers and the entities (classes, acts) each one
//! belongs to, finds a slot order in which every performer has at least
//! `min_gap` other entities between two appearances, while keeping
//! user-pinned entities where they are.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Participant`, `Entity`, `Conflict`, `Show`
//! - **`roster`**: CSV roster parsing and entity construction
//! - **`scheduler`**: Multi-start greedy optimizer, conflict detection, scoring
//! - **`service`**: Off-thread optimizer worker with timeouts
//! - **`validation`**: Input integrity checks (duplicate names, locked-slot collisions)
//! - **`config`**: TOML configuration and logging setup
//!
//! # Example
//!
//! ```
//! use show_order::models::Show;
//! use show_order::roster::{parse_roster, RosterOptions};
//! use show_order::scheduler::ShowOrderOptimizer;
//!
//! let csv = "first_name,last_name,classes\nAda,L,\"Tap, Ballet\"\nAlan,T,Jazz\n";
//! let roster = parse_roster(csv.as_bytes(), &RosterOptions::default()).unwrap();
//!
//! let mut show = Show::from_participants(&roster, 1);
//! let conflicts = show.reoptimize(&ShowOrderOptimizer::new().with_seed(1));
//! assert!(conflicts.is_empty());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Marti et al. (2013), "Multi-start methods for combinatorial optimization"

pub mod config;
pub mod error;
pub mod models;
pub mod roster;
pub mod scheduler;
pub mod service;
pub mod validation;

pub use error::{Error, Result};
